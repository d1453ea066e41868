/// Where the caller should send the user after a session operation.
///
/// The session never navigates on its own; callers resolve the intent with
/// [`Routes::path_for`](crate::config::Routes::path_for).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Navigation {
    /// Stay on the current page.
    #[default]
    None,
    Login,
    Dashboard,
}

impl Navigation {
    /// Whether the current page may be shown, i.e. no redirect was requested.
    pub fn allows(self) -> bool {
        self == Navigation::None
    }
}
