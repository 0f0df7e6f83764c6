pub use reasons::WaitingReasons;
pub use settings::Settings;
pub use settings::SettingsError;
pub use tokens::Tokens;
pub use verdict::Verdict;

mod reasons;
mod settings;
mod tokens;
mod verdict;
