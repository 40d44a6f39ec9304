use chrono::TimeZone;
use g2w::codec::{Feedable, Hydratable};
use g2w::entity::{Registrant, Webinar};
use g2w::response::{process, Processed};
use g2w::transport::{bearer_headers, Method, Transport};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn feed_after_hydrate_reproduces_schema_leaves() {
    let wire = json!({
        "subject": "Lifetimes",
        "description": "Borrow checker deep dive",
        "times": [{"startTime": "2023-05-01T10:00:00Z", "endTime": "2023-05-01T11:00:00Z"}],
        "timeZone": "Europe/Rome",
        "type": "single_session",
        "isPasswordProtected": false
    });

    let mut webinar = Webinar::create();
    webinar.hydrate(&wire);

    assert_eq!(webinar.feed(), wire);
}

#[test]
fn registrant_form_survives_hydrate_and_feed() {
    let wire = json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "address": "12 St James's Square",
        "city": "London",
        "state": null,
        "zipCode": "SW1Y 4JH",
        "country": "UK",
        "phone": "+44 20 0000 0000",
        "organization": "Analytical Engines"
    });

    let mut registrant = Registrant::create("x", "y", "z");
    registrant.hydrate(&wire);

    assert_eq!(registrant.feed(), wire);
}

#[test]
fn description_opening_with_a_timestamp_survives_the_round_trip() {
    let wire = json!({
        "subject": "Lifetimes",
        "description": "2023-05-01T10:00:00Z kickoff, then Q&A",
        "times": [{"startTime": "2023-05-01T10:00:00Z", "endTime": "2023-05-01T11:00:00Z"}],
        "timeZone": "Europe/Rome",
        "type": "single_session",
        "isPasswordProtected": false
    });

    let mut webinar = Webinar::create();
    webinar.hydrate(&wire);

    assert_eq!(
        webinar.description.as_deref(),
        Some("2023-05-01T10:00:00Z kickoff, then Q&A")
    );
    assert_eq!(webinar.feed(), wire);
}

#[test]
fn numeric_form_leaves_keep_their_json_type() {
    let wire = json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "address": null,
        "city": "Milano",
        "state": null,
        "zipCode": 20100,
        "country": "IT",
        "phone": 3912345,
        "organization": null
    });

    let mut registrant = Registrant::create("x", "y", "z");
    registrant.hydrate(&wire);

    assert_eq!(registrant.feed(), wire);
}

#[test]
fn utc_wire_time_reads_as_local_time_two_hours_ahead() {
    let mut webinar = Webinar::read();
    webinar.hydrate(&json!({"times": [{"startTime": "2023-05-01T10:00:00Z"}]}));

    let start = webinar.start_time.expect("start time");
    assert_eq!(start.naive_local().to_string(), "2023-05-01 12:00:00");

    let mut update = Webinar::update("9");
    update.start_time = Some(start);
    assert_eq!(update.feed()["times"][0]["startTime"], "2023-05-01T10:00:00Z");
}

#[test]
fn local_noon_in_rome_goes_out_as_ten_utc() {
    let mut webinar = Webinar::create();
    webinar.start_time = chrono_tz::Europe::Rome
        .with_ymd_and_hms(2023, 5, 1, 12, 0, 0)
        .single();

    assert_eq!(webinar.feed()["times"][0]["startTime"], "2023-05-01T10:00:00Z");
    assert_eq!(webinar.feed()["times"][0]["endTime"], serde_json::Value::Null);
}

#[test]
fn list_of_webinars_hydrates_independent_clones() {
    let processed = process(
        &json!([{"webinarKey": "1"}, {"webinarKey": "2"}]),
        false,
        Webinar::read(),
    )
    .expect("process");

    let Processed::Collection(mut webinars) = processed else {
        panic!("expected a collection");
    };
    assert_eq!(webinars.len(), 2);
    webinars[0].subject = Some("changed".into());
    assert_eq!(webinars[0].webinar_key.as_deref(), Some("1"));
    assert_eq!(webinars[1].webinar_key.as_deref(), Some("2"));
    assert_eq!(webinars[1].subject, None);
}

#[tokio::test]
async fn fetched_registrants_hydrate_in_response_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/G2W/rest/organizers/org-1/webinars/77/registrants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"registrantKey": 1, "firstName": "Ada", "registrationDate": "2023-04-01T08:00:00Z"},
            {"registrantKey": 2, "firstName": "Grace", "registrationDate": "2023-04-02T08:00:00Z"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let output = Transport::new()
        .unwrap()
        .send(
            &format!("{}/G2W/rest/organizers/org-1/webinars/77/registrants", server.uri()),
            Method::Get,
            &json!({}),
            &bearer_headers("tok"),
        )
        .await
        .expect("send")
        .into_json()
        .expect("json");
    let registrants = process(&output, false, Registrant::read())
        .expect("process")
        .into_vec();

    let names: Vec<_> = registrants
        .iter()
        .map(|r| r.first_name.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Ada", "Grace"]);
    assert_eq!(
        registrants[1].registration_date.unwrap().naive_local().to_string(),
        "2023-04-02 10:00:00"
    );
}

#[test]
fn remote_error_payload_is_not_hydrated() {
    let err = process(
        &json!({"int_err_code": "WebinarNotFound", "msg": "The requested webinar was not found"}),
        true,
        Webinar::read(),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "Remote error: The requested webinar was not found");
}

#[test]
fn null_msg_payload_hydrates_normally() {
    let webinar = process(
        &json!({"msg": null, "int_err_code": null, "webinarKey": "77", "subject": "Async"}),
        true,
        Webinar::read(),
    )
    .expect("process")
    .single()
    .expect("single");

    assert_eq!(webinar.webinar_key.as_deref(), Some("77"));
    assert_eq!(webinar.subject.as_deref(), Some("Async"));
}
