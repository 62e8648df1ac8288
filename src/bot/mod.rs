/// Query endpoint driving the relay pipeline
pub mod handlers;
/// Send helpers with retry and inline keyboards
pub mod messaging;
