use argh::FromArgs;
use s3::{Config, Interpreter, logging};

#[derive(FromArgs)]
/// A small POSIX-like command shell.
///
/// With no COMMAND, read commands interactively. With a COMMAND string, run it
/// once and exit with the status of its last segment.
struct Args {
    #[argh(switch, short = 'v')]
    /// log debug information to stderr.
    verbose: bool,

    #[argh(positional)]
    /// command line to run instead of starting the interactive prompt.
    command: Option<String>,
}

fn main() {
    let args: Args = argh::from_env();
    logging::init(logging::level(args.verbose));

    let mut sh = Interpreter::new(Config::load());

    match args.command {
        Some(line) => std::process::exit(sh.run_line(&line)),
        None => {
            if let Err(e) = sh.repl() {
                eprintln!("s3: {e:#}");
                std::process::exit(1);
            }
        }
    }
}
