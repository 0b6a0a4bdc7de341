pub mod contact;
pub mod deal;
pub mod note;
pub mod user;

pub use contact::Contact;
pub use deal::Deal;
pub use note::Note;
pub use user::User;
