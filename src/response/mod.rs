//! Response classification and hydration.

use serde_json::{Map, Value};

use crate::codec::Hydratable;
use crate::error::{G2wError, Result};

/// Hydrated result of a resource call.
#[derive(Debug, Clone, PartialEq)]
pub enum Processed<E> {
    Single(E),
    Collection(Vec<E>),
}

impl<E> Processed<E> {
    /// Items in response order; a single entity yields one item.
    pub fn into_vec(self) -> Vec<E> {
        match self {
            Self::Single(entity) => vec![entity],
            Self::Collection(items) => items,
        }
    }

    pub fn single(self) -> Option<E> {
        match self {
            Self::Single(entity) => Some(entity),
            Self::Collection(_) => None,
        }
    }
}

/// Classify a decoded response and hydrate it into `prototype`.
///
/// With `single` the prototype itself is hydrated and returned; otherwise
/// every item of the response hydrates its own clone, in order.
pub fn process<E>(response: &Value, single: bool, prototype: E) -> Result<Processed<E>>
where
    E: Hydratable + Clone,
{
    if single {
        process_single(response, prototype).map(Processed::Single)
    } else {
        process_collection(response, &prototype).map(Processed::Collection)
    }
}

pub fn process_single<E: Hydratable>(response: &Value, mut prototype: E) -> Result<E> {
    check_remote_error(response)?;
    prototype.hydrate(response);
    Ok(prototype)
}

/// Array items, or the values of a mapping, each into a fresh clone.
pub fn process_collection<E>(response: &Value, prototype: &E) -> Result<Vec<E>>
where
    E: Hydratable + Clone,
{
    check_remote_error(response)?;
    let items: Vec<&Value> = match response {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .map(|item| {
            let mut entity = prototype.clone();
            entity.hydrate(item);
            entity
        })
        .collect())
}

/// Fail with a remote error when the payload carries `msg` or `int_err_code`.
pub fn check_remote_error(response: &Value) -> Result<()> {
    let Value::Object(map) = response else {
        return Ok(());
    };
    let code = text_of(map, "int_err_code");
    if let Some(message) = text_of(map, "msg") {
        return Err(G2wError::Remote { code, message });
    }
    match code {
        Some(code) => Err(G2wError::Remote {
            message: code.clone(),
            code: Some(code),
        }),
        None => Ok(()),
    }
}

fn text_of(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).filter(|value| !value.is_null()).map(|value| match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Webinar;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn collection_clones_are_ordered_and_independent() {
        let webinars =
            process_collection(&json!([{"webinarKey": "1"}, {"webinarKey": "2"}]), &Webinar::read())
                .unwrap();
        let keys: Vec<_> = webinars.iter().map(|w| w.webinar_key.as_deref()).collect();
        assert_eq!(keys, vec![Some("1"), Some("2")]);
    }

    #[test]
    fn mapping_values_are_items_too() {
        let webinars = process(
            &json!({"a": {"subject": "first"}, "b": {"subject": "second"}}),
            false,
            Webinar::read(),
        )
        .unwrap()
        .into_vec();
        assert_eq!(webinars[0].subject.as_deref(), Some("first"));
        assert_eq!(webinars[1].subject.as_deref(), Some("second"));
    }

    #[test]
    fn single_hydrates_the_prototype() {
        let webinar = process(&json!({"subject": "one"}), true, Webinar::read())
            .unwrap()
            .single()
            .unwrap();
        assert_eq!(webinar.subject.as_deref(), Some("one"));
    }

    #[test]
    fn msg_carries_code_when_present() {
        let err = check_remote_error(&json!({"int_err_code": "NotFound", "msg": "No webinar"}))
            .unwrap_err();
        assert!(matches!(
            err,
            G2wError::Remote { code: Some(code), message } if code == "NotFound" && message == "No webinar"
        ));
    }

    #[test]
    fn null_msg_and_code_are_not_errors() {
        let webinar = process(
            &json!({"msg": null, "int_err_code": null, "subject": "fine"}),
            true,
            Webinar::read(),
        )
        .unwrap()
        .single()
        .unwrap();
        assert_eq!(webinar.subject.as_deref(), Some("fine"));
    }

    #[test]
    fn code_alone_is_an_error() {
        let err = process(&json!({"int_err_code": "InvalidToken"}), true, Webinar::read())
            .unwrap_err();
        assert!(matches!(err, G2wError::Remote { message, .. } if message == "InvalidToken"));
    }

    #[test]
    fn scalars_and_empty_payloads_hydrate_nothing() {
        assert!(process_collection(&json!("text"), &Webinar::read()).unwrap().is_empty());
        assert!(process_collection(&json!([]), &Webinar::read()).unwrap().is_empty());
    }
}
