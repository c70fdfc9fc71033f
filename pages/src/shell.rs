use crate::error::PageError;
use crate::router::Route;

/// Everything a page needs from its host: dialogs and the location hash.
pub trait Shell: Send + Sync {
    /// Asks a yes/no question and blocks until it is answered.
    fn confirm(&self, question: &str) -> bool;

    fn alert(&self, message: &str);

    /// Surfaces a failed action. The page stays where it is.
    fn show_exception(&self, error: &PageError);

    /// Changes the location hash. The host feeds the new hash back into
    /// [`Router::navigate`](crate::router::Router::navigate).
    fn navigate(&self, route: Route);
}
