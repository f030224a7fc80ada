pub mod stderr_console;
