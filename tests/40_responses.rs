mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{id_of, workspace_id, Api};

/// A form with a required name, an optional email and a decorative image
async fn survey() -> Result<(Api, String, Vec<Value>)> {
    let (api, user) = Api::user("builder").await?;
    let ws = workspace_id(&user);

    let (_, form) = api
        .post(&format!("/api/workspaces/{}/forms", ws), json!({"name": "Survey"}))
        .await?;
    let form_id = id_of(&form);

    let elements = json!({"elements": [
        {"id": "name", "type": "Text", "label": "Name", "required": true},
        {"id": "email", "type": "Email", "label": "Email"},
        {"id": "banner", "type": "Image", "link": "https://example.com/banner.png"}
    ]});
    let (status, body) = api.put(&format!("/api/forms/{}/elements", form_id), elements.clone()).await?;
    assert_eq!(status, StatusCode::OK);

    // Saving again must not duplicate anything
    let (_, again) = api.put(&format!("/api/forms/{}/elements", form_id), elements).await?;
    assert_eq!(body["data"], again["data"]);

    let elements = body["data"].as_array().context("elements")?.clone();
    Ok((api, form_id, elements))
}

async fn open_session(api: &Api, form_id: &str) -> Result<String> {
    let (status, body) = api.post(&format!("/forms/{}/session", form_id), json!({})).await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(body["data"]["session_id"].as_str().context("session_id")?.to_string())
}

#[tokio::test]
async fn respondent_flow_end_to_end() -> Result<()> {
    let (builder, form_id, elements) = survey().await?;
    let respondent = Api::anonymous().await?;
    let (name_id, email_id) = (elements[0]["id"].clone(), elements[1]["id"].clone());

    let (status, form) = respondent.get(&format!("/forms/{}", form_id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["data"]["elements"].as_array().map(Vec::len), Some(3));

    let session = open_session(&respondent, &form_id).await?;
    let answer = |element: &Value, value: &str| {
        json!({"session_id": session, "element_id": element, "value": value})
    };
    let responses = format!("/forms/{}/responses", form_id);
    let submit = format!("/forms/{}/submit/{}", form_id, session);

    let (status, _) = respondent.post(&responses, answer(&email_id, "ada@example.com")).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = respondent.post(&submit, json!({})).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INCOMPLETE_SUBMISSION");

    for value in ["A", "Ad", "Ada"] {
        let (status, _) = respondent.post(&responses, answer(&name_id, value)).await?;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = respondent.post(&submit, json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = respondent.post(&submit, json!({})).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = respondent.post(&responses, answer(&name_id, "Grace")).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = builder.get(&format!("/api/forms/{}/responses", form_id)).await?;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["counters"], json!({"view_count": 1, "start_count": 1, "completed_count": 1}));
    assert_eq!(data["elements"].as_array().map(Vec::len), Some(2));

    let entry = &data["entries"][0];
    assert_eq!(entry["session_id"], session.as_str());
    assert_eq!(entry["is_completed"], true);
    let name_answer = entry["responses"]
        .as_array()
        .context("responses")?
        .iter()
        .find(|r| r["element_id"] == name_id)
        .context("name answer")?;
    assert_eq!(name_answer["value"], "Ada");
    Ok(())
}

#[tokio::test]
async fn image_elements_do_not_take_answers() -> Result<()> {
    let (_, form_id, elements) = survey().await?;
    let respondent = Api::anonymous().await?;
    let session = open_session(&respondent, &form_id).await?;

    let (status, _) = respondent
        .post(
            &format!("/forms/{}/responses", form_id),
            json!({"session_id": session, "element_id": elements[2]["id"], "value": "x"}),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn malformed_session_is_rejected() -> Result<()> {
    let (_, form_id, elements) = survey().await?;
    let respondent = Api::anonymous().await?;

    let (status, body) = respondent
        .post(
            &format!("/forms/{}/responses", form_id),
            json!({"session_id": "not-a-session", "element_id": elements[0]["id"], "value": "x"}),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["session_id"].is_string());

    let (status, _) = respondent
        .post(&format!("/forms/{}/submit/not-a-session", form_id), json!({}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unknown_form_is_not_found() -> Result<()> {
    let respondent = Api::anonymous().await?;
    let missing = uuid::Uuid::new_v4();

    let (status, _) = respondent.get(&format!("/forms/{}", missing)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = respondent.post(&format!("/forms/{}/session", missing), json!({})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn strangers_cannot_read_responses() -> Result<()> {
    let (_, form_id, _) = survey().await?;
    let (stranger, _) = Api::user("nosy").await?;

    let (status, _) = stranger.get(&format!("/api/forms/{}/responses", form_id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
