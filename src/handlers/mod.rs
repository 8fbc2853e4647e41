// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth)
//
// Respondents never log in: everything they touch lives under the public tier
// and is keyed by a form id plus a session token. Form builders work through
// the protected tier, where every handler receives an `AuthUser`.
pub mod public; // Tier 1: No authentication required (/auth/*, /forms/*)
pub mod protected; // Tier 2: JWT authentication required (/api/*)

/*
HANDLER CONVENTIONS:

1. **Thin handlers**: extract path/query/body, call one service method, wrap
   the result in `ApiResponse`. No authorization decisions are made here; the
   services resolve access themselves.

2. **Extractor rejections**: bodies, paths and queries are taken as
   `Result<_, _Rejection>` so malformed input comes back in the standard error
   shape instead of axum's plain-text rejection.

3. **Errors**: every handler returns `ApiResult<T>`; `ServiceError` converts
   into `ApiError` with `?`.

src/handlers/
├── mod.rs              ← This file
├── public/
│   ├── auth.rs         ← POST /auth/signup, POST /auth/login
│   └── forms.rs        ← GET /forms/:id, session, responses, submit
└── protected/
    ├── user.rs         ← /api/user[/profile|/theme]
    ├── workspaces.rs   ← /api/workspaces[/:id], sharing
    ├── folders.rs      ← /api/workspaces/:id/folders[/:folder_id]
    └── forms.rs        ← /api/workspaces/:id/forms, /api/forms/:id/...
*/
