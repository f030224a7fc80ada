pub mod stored_session;
