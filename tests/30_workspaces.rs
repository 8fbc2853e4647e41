mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{id_of, workspace_id, Api};

#[tokio::test]
async fn owner_builds_folders_and_forms() -> Result<()> {
    let (api, user) = Api::user("owner").await?;
    let ws = workspace_id(&user);

    let (status, folder) = api
        .post(&format!("/api/workspaces/{}/folders", ws), json!({"name": "Surveys"}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let folder_id = id_of(&folder);

    let (status, _) = api
        .post(
            &format!("/api/workspaces/{}/forms", ws),
            json!({"name": "Nested", "folder_id": folder_id}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = api
        .post(&format!("/api/workspaces/{}/forms", ws), json!({"name": "Top"}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = api.get(&format!("/api/workspaces/{}/forms", ws)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["access_level"], "edit");
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["items"][0]["name"], "Top");

    let (_, body) = api
        .get(&format!("/api/workspaces/{}/forms?folder_id={}", ws, folder_id))
        .await?;
    assert_eq!(body["data"]["items"][0]["name"], "Nested");

    let (status, body) = api
        .get(&format!("/api/workspaces/{}/folders/{}", ws, folder_id))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Surveys");
    assert_eq!(body["data"]["form_list"][0]["name"], "Nested");
    assert_eq!(body["data"]["access_level"], "edit");

    let (status, body) = api.get(&format!("/api/workspaces/{}", ws)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["folders"][0]["name"], "Surveys");
    Ok(())
}

#[tokio::test]
async fn deleting_a_folder_moves_forms_to_top_level() -> Result<()> {
    let (api, user) = Api::user("tidy").await?;
    let ws = workspace_id(&user);

    let (_, folder) = api
        .post(&format!("/api/workspaces/{}/folders", ws), json!({"name": "Old"}))
        .await?;
    let folder_id = id_of(&folder);
    let (_, form) = api
        .post(
            &format!("/api/workspaces/{}/forms", ws),
            json!({"name": "Keep me", "folder_id": folder_id}),
        )
        .await?;

    let (status, _) = api
        .delete(&format!("/api/workspaces/{}/folders/{}", ws, folder_id))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = api.get(&format!("/api/workspaces/{}/forms", ws)).await?;
    assert_eq!(body["data"]["items"][0]["id"], form["data"]["id"]);
    assert!(body["data"]["items"][0]["folder_id"].is_null());
    Ok(())
}

#[tokio::test]
async fn deleting_a_form_twice_is_not_found() -> Result<()> {
    let (api, user) = Api::user("deleter").await?;
    let ws = workspace_id(&user);

    let (_, form) = api
        .post(&format!("/api/workspaces/{}/forms", ws), json!({"name": "Temp"}))
        .await?;
    let path = format!("/api/workspaces/{}/forms/{}", ws, id_of(&form));

    let (status, _) = api.delete(&path).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = api.delete(&path).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn sharing_controls_what_collaborators_can_do() -> Result<()> {
    let (owner, owner_user) = Api::user("sharer").await?;
    let (viewer, viewer_user) = Api::user("viewer").await?;
    let (stranger, _) = Api::user("stranger").await?;
    let ws = workspace_id(&owner_user);

    // Before sharing the workspace is invisible
    let (status, _) = stranger.get(&format!("/api/workspaces/{}/forms", ws)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let share = json!({"email": viewer_user["email"], "access_level": "view"});
    let (status, _) = owner.post("/api/workspaces/share", share.clone()).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = owner.post("/api/workspaces/share", share).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = owner
        .post(
            "/api/workspaces/share",
            json!({"email": owner_user["email"], "access_level": "edit"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    // Viewers read but cannot write
    let (status, body) = viewer.get(&format!("/api/workspaces/{}/forms", ws)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["access_level"], "view");
    let (status, body) = viewer
        .post(&format!("/api/workspaces/{}/folders", ws), json!({"name": "Nope"}))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (_, body) = viewer.get("/api/workspaces").await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"][0]["role"], "owner");
    assert_eq!(body["data"][0]["access_level"], "edit");
    assert_eq!(body["data"][1]["role"], "collaborator");
    assert_eq!(body["data"][1]["access_level"], "view");
    Ok(())
}

#[tokio::test]
async fn share_link_grants_the_caller() -> Result<()> {
    let (owner, owner_user) = Api::user("linker").await?;
    let (visitor, _) = Api::user("visitor").await?;
    let ws = workspace_id(&owner_user);

    let (status, _) = visitor
        .post("/api/workspaces/share/link", json!({"workspace_id": ws, "access_level": "edit"}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = visitor
        .post(&format!("/api/workspaces/{}/forms", ws), json!({"name": "From a link"}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = owner
        .post("/api/workspaces/share/link", json!({"workspace_id": ws, "access_level": "view"}))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = visitor
        .post("/api/workspaces/share/link", json!({"workspace_id": ws, "access_level": "admin"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["access_level"].is_string());
    Ok(())
}
