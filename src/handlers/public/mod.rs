// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None (completely public access)
// Route Prefix: No /api prefix (e.g., /auth/*, /forms/*)
// Middleware: None
pub mod auth;
pub mod forms;

/*
PUBLIC HANDLER ARCHITECTURE:

1. **Account entry points**: signup and login hand out the JWT that unlocks
   the protected tier.

2. **Respondent flow**: a respondent loads a form, asks for a session, posts
   answers one element at a time, then submits. The session id returned by
   `POST /forms/:form_id/session` is the only credential: whoever holds it can
   answer and submit for that session.

Usage Pattern:
```rust
Router::new()
    .route("/auth/login", post(auth::login_post))
    .route("/forms/:form_id/session", post(forms::session_post))
    // No middleware layers - completely public
```
*/
