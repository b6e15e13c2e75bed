mod classify;
mod normalize;
mod redirect;
mod types;

pub use classify::classify;
pub use normalize::normalize;
pub use redirect::{LinkResolver, RedirectResolver, ResolveError, DEFAULT_TIMEOUT};
pub use types::*;
