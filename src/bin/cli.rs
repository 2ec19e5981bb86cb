//! Mucom command line interface.

use std::{
    env,
    path::{Path, PathBuf},
    process,
};

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_t, App, AppSettings::*, Arg,
    ArgMatches, SubCommand,
};
use console::style;
use log::{debug, trace, LevelFilter};
use simplelog::*;

use mucom::{
    self as mu,
    terminal::{self, Awaited, TerminalView},
    Coordinator, Outcome, View,
};

fn main() {
    ctrlc::set_handler(move || {
        println!("🛑 received Ctrl+C!");
        process::exit(0);
    })
    .expect("Failed to install my Ctrl-C handler!");

    let matches = App::new(crate_name!())
        .version(format!("v{}", crate_version!()).as_str())
        .author(crate_authors!())
        .about(crate_description!())
        .long_about(
            "\n\
            Mucom edits MicroPython scripts for the BBC micro:bit, flashes \
            them onto the board and gives access to the MicroPython REPL \
            running on it.\n\
            \n\
            Without a subcommand, it reopens the scripts of the last session \
            and shows an interactive menu. Flashing embeds the current script \
            into a MicroPython runtime image (see `--runtime`) and copies the \
            result onto the board's USB drive.\n\
            \n\
            Loading a `.hex` image instead of a `.py` script recovers the \
            script embedded in it.\
        ",
        )
        .max_term_width(80)
        .setting(ColoredHelp)
        .setting(NextLineHelp)
        .setting(VersionlessSubcommands)
        .arg(
            Arg::with_name("RUNTIME")
                .help("MicroPython runtime `.hex` image used for flashing")
                .short("-r")
                .long("--runtime")
                .takes_value(true)
                .require_equals(true)
                .global(true),
        )
        .arg(
            Arg::with_name("PROJECTS")
                .help("directory where scripts are loaded from and saved to")
                .long("--projects")
                .takes_value(true)
                .require_equals(true)
                .global(true),
        )
        .arg(
            Arg::with_name("DATA_DIR")
                .help("directory holding the session file")
                .long("--data-dir")
                .takes_value(true)
                .require_equals(true)
                .global(true),
        )
        .arg(
            Arg::with_name("BAUD_RATE")
                .help("serial port baud rate")
                .short("-b")
                .long("--baud-rate")
                .takes_value(true)
                .default_value("115200")
                .require_equals(true)
                .global(true),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .global(true)
                .help(
                    "Sets the logging level of verbosity, repeat several times for \
                     higher verbosity",
                ),
        )
        .subcommand(
            SubCommand::with_name("flash")
                .about("flashes a script onto the micro:bit")
                .arg(
                    Arg::with_name("SCRIPT")
                        .help("the `.py` script, or a `.hex` image to re-flash")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("WAIT")
                        .help("wait for the micro:bit to be plugged in")
                        .short("-w")
                        .long("--wait"),
                ),
        )
        .subcommand(
            SubCommand::with_name("extract")
                .about("recovers the script embedded in a firmware image")
                .arg(
                    Arg::with_name("IMAGE")
                        .help("the `.hex` firmware image")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("OUTPUT")
                        .help("where to save the script; printed to stdout when not set")
                        .index(2),
                ),
        )
        .subcommand(
            SubCommand::with_name("repl")
                .about("opens the MicroPython REPL of the micro:bit (Esc to leave)")
                .arg(
                    Arg::with_name("WAIT")
                        .help("wait for the micro:bit to be plugged in")
                        .short("-w")
                        .long("--wait"),
                ),
        )
        .get_matches();

    // Global arguments are propagated down to the subcommand, if any.
    let scope = matches.subcommand().1.unwrap_or(&matches);

    // Vary the output based on how many times the user used the "verbose" flag
    // (i.e. 'mucom -v -v -v' or 'mucom -vvv' vs 'mucom -v'
    let log_level = match scope.occurrences_of("v") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .unwrap();

    trace!("{:#?}", matches);

    let settings = settings(scope);
    debug!("{:#?}", settings);

    let mut coordinator = Coordinator::for_host(settings).unwrap_or_else(|e| {
        println!("{}: {}", style("error").red(), e);
        process::exit(1);
    });
    let mut view = TerminalView::new();

    let exit_code = match matches.subcommand() {
        ("flash", Some(args)) => flash(&mut coordinator, &mut view, args),
        ("extract", Some(args)) => extract(&mut coordinator, &mut view, args),
        ("repl", Some(args)) => {
            if args.is_present("WAIT")
                && terminal::wait_for_board(coordinator.locator(), Awaited::SerialPort)
            {
                process::exit(2);
            }
            terminal::repl(&mut coordinator, &mut view);
            0
        }
        _ => {
            coordinator.restore_session(&mut view);
            terminal::run_menu(&mut coordinator, &mut view)
        }
    };
    debug!("exit code: {}", exit_code);
    process::exit(exit_code);
}

fn settings(matches: &ArgMatches) -> mu::Settings {
    // It's safe to call unwrap on the baud rate, because the value with either
    // be what the user input at runtime or the default value
    let baud_rate = value_t!(matches.value_of("BAUD_RATE"), u32).unwrap_or_else(|_| {
        println!(
            "{}: `{}` needs to be a numeric value",
            style("error").red(),
            style("baud-rate").cyan()
        );
        println!(
            "   {} `{}` is not a valid value",
            style("-->").cyan(),
            style(matches.value_of("BAUD_RATE").unwrap()).on_red()
        );
        process::exit(-1);
    });

    let mut builder = mu::SettingsBuilder::default().baud_rate(baud_rate);
    if let Some(runtime) = matches.value_of("RUNTIME") {
        builder = builder.runtime_image(absolute(runtime));
    }
    if let Some(projects) = matches.value_of("PROJECTS") {
        builder = builder.projects_dir(absolute(projects));
    }
    if let Some(data_dir) = matches.value_of("DATA_DIR") {
        builder = builder.data_dir(absolute(data_dir));
    }
    builder.finalize()
}

fn flash(coordinator: &mut Coordinator, view: &mut TerminalView, args: &ArgMatches) -> i32 {
    if let Some(code) = load_argument(coordinator, view, args.value_of("SCRIPT").unwrap()) {
        return code;
    }
    if args.is_present("WAIT") && terminal::wait_for_board(coordinator.locator(), Awaited::Drive)
    {
        return 2;
    }
    exit_code(&coordinator.flash(view))
}

fn extract(coordinator: &mut Coordinator, view: &mut TerminalView, args: &ArgMatches) -> i32 {
    if let Some(code) = load_argument(coordinator, view, args.value_of("IMAGE").unwrap()) {
        return code;
    }
    match args.value_of("OUTPUT") {
        Some(output) => {
            view.queue_save_path(absolute(output));
            exit_code(&coordinator.save(view))
        }
        None => {
            if let Some(document) = view.current_tab() {
                print!("{}", document.text);
            }
            0
        }
    }
}

fn exit_code(outcome: &Outcome) -> i32 {
    match outcome {
        Outcome::Completed | Outcome::Quit => 0,
        Outcome::Reported(_) => 1,
        Outcome::Abandoned => 2,
    }
}

/// Loads the file named on the command line into a new document. Returns the
/// exit code to stop with when that did not work.
fn load_argument(coordinator: &mut Coordinator, view: &mut TerminalView, arg: &str) -> Option<i32> {
    let path = absolute(arg);
    view.queue_load_path(path.clone());
    let outcome = coordinator.load(view);
    if let Some(message) = load_failure(&outcome, &path) {
        println!("{}", message);
    }
    if outcome.is_completed() {
        None
    } else {
        Some(exit_code(&outcome))
    }
}

/// The line to print when loading `path` did nothing. Reported failures were
/// already shown by the view.
fn load_failure(outcome: &Outcome, path: &Path) -> Option<String> {
    match outcome {
        Outcome::Abandoned => Some(format!(
            "{}: no such file `{}`",
            style("error").red(),
            path.display()
        )),
        _ => None,
    }
}

/// Paths given on the command line are relative to the working directory.
fn absolute(arg: &str) -> PathBuf {
    let path = PathBuf::from(arg);
    if path.is_relative() {
        if let Ok(cwd) = env::current_dir() {
            return cwd.join(path);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_file_is_named() {
        let message = load_failure(&Outcome::Abandoned, Path::new("/tmp/missing.py")).unwrap();
        assert!(message.contains("no such file `/tmp/missing.py`"));
    }

    #[test]
    fn other_outcomes_print_nothing_more() {
        let path = Path::new("/tmp/blink.py");
        assert!(load_failure(&Outcome::Completed, path).is_none());
        assert!(load_failure(&Outcome::Reported(mu::Error::NoScriptFound), path).is_none());
    }

    #[test]
    fn relative_arguments_follow_the_working_directory() {
        assert_eq!(absolute("/opt/mu/micropython.hex"), PathBuf::from("/opt/mu/micropython.hex"));
        let relative = absolute("blink.py");
        assert!(relative.is_absolute());
        assert_eq!(relative, env::current_dir().unwrap().join("blink.py"));
    }
}
