pub mod path;
pub mod validator;
