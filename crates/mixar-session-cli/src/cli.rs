use clap::{Parser, Subcommand, ValueEnum};

/// Sign in to the Mixar dashboard backend and make authenticated requests
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Keep the session in the OS keychain instead of the cache directory
    #[arg(long, default_value_t = false, global = true)]
    pub keyring: bool,

    /// Override the backend base URL for this invocation
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show whether a session is stored and who it belongs to
    Status,

    /// Sign in with email and password (password is prompted)
    Login {
        #[arg(long)]
        email: String,
    },

    /// Create an account: send a one-time code by email, then verify it
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },

    /// Print the Google consent URL to open in a browser
    GoogleUrl,

    /// Complete Google sign-in with the code from the OAuth redirect
    GoogleCallback {
        #[arg(long)]
        code: String,
    },

    /// Reload the current user from the backend
    Whoami,

    /// End the session locally and on the backend
    Logout,

    /// Send an authenticated request and print the response
    Request {
        /// HTTP method, e.g. GET or POST
        method: String,
        /// Endpoint path relative to the API base URL, e.g. /projects
        endpoint: String,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },

    /// Evaluate a page guard against the stored session
    Guard {
        #[arg(value_enum)]
        kind: GuardKind,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum GuardKind {
    /// Pages that need a signed-in user
    Auth,
    /// Admin pages
    Superuser,
    /// Login and signup pages
    Guest,
}
