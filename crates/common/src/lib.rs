pub mod api;

pub trait CliError {
    fn exitcode(&self) -> exitcode::ExitCode;
}
