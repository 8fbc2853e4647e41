// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: JWT Authentication Required
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware injects `AuthUser` into request extensions
pub mod folders;
pub mod forms;
pub mod user;
pub mod workspaces;

/*
PROTECTED HANDLER ARCHITECTURE:

```rust
Router::new()
    .route("/api/workspaces", get(workspaces::list))
    .route("/api/forms/:form_id/elements", put(forms::elements_put))
    .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
```

The JWT only proves who the caller is. What they may do in a workspace is
decided per call by the services:

- **Owner**: the workspace's creator, always at edit level
- **Collaborator(edit | view)**: holds a grant for the workspace
- **None**: reads answer 404 (the workspace stays invisible), writes answer 403
*/
