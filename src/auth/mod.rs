//! Admin sign-in: Google OAuth, the session cookie, and the route gate.

pub mod context;
pub mod gate;
pub mod google;
pub mod session;

pub use context::{decide_login, AuthContext, LoginOutcome};
pub use gate::{admin_gate, evaluate, GateDecision};
pub use google::{GoogleOAuth, GoogleProfile, IdentityProvider, OAuthError};
pub use session::{AdminSession, CookieState, SESSION_COOKIE};
