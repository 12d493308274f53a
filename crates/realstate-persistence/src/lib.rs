//! Lookup layer for the Real State bot.
//!
//! Resolves Telegram accounts to application users and organizations
//! through the managed database's REST interface.
//!
//! # Example
//!
//! ```no_run
//! use realstate_persistence::{SupabaseDirectory, UserDirectory};
//!
//! # async fn run() -> realstate_persistence::Result<()> {
//! let directory = SupabaseDirectory::new("https://proj.supabase.co", "service-role-key");
//!
//! if let Some(user) = directory.find_by_telegram_id(123456789).await? {
//!     let orgs = directory.list_organizations(&user.user_id).await?;
//!     println!("{} belongs to {} organizations", user.user_id, orgs.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod directory;
pub mod error;
pub mod supabase;

pub use directory::UserDirectory;
pub use error::{DirectoryError, Result};
pub use supabase::SupabaseDirectory;
