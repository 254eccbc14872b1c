pub mod lookup;
pub mod phone;
pub mod scanner;

pub use lookup::*;
pub use phone::*;
pub use scanner::*;
