use std::io::Read;

/// Input used by `--demo`, the same list the original demo page starts with.
const DEMO_INPUT: &str = "numpy==1.20\nnumpy==1.25\npandas==1.3\npandas==1.4";

#[tokio::main]
async fn main() -> std::process::ExitCode {
	env_logger::init();

	let mut opts;

	/* Parse console input */
	let parsed_options = {
		let args: Vec<String> = std::env::args().collect();

		opts = getopts::Options::new();
		opts.optflag( "h", "help",    "Show help");
		opts.optflag( "v", "verbose", "Also list lines that were skipped");
		opts.optflag( "",  "demo",    "Use a built-in sample instead of reading input");
		opts.optopt(  "o", "output",  "Where to write the snapshot", "PATH");
		opts.parsing_style(getopts::ParsingStyle::FloatingFrees);

		let parsed_options = match opts.parse(&args[1..]) {
			Ok(m)  => { m }
			Err(e) => { eprintln!("Unable to parse options: {}", e); return std::process::ExitCode::FAILURE }
		};

		if parsed_options.opt_present("h") {
			eprintln!("{}", opts.usage(USAGE));
			return std::process::ExitCode::SUCCESS;
		}

		parsed_options
	};

	let command = match parsed_options.free.first().map(|c| c.parse::<Command>()) {
		Some(Ok(c)) => c,
		Some(Err(e)) => { log::error!("{}", e); eprintln!("{}", opts.usage(USAGE)); return std::process::ExitCode::FAILURE },
		None => { log::error!("No command given."); eprintln!("{}", opts.usage(USAGE)); return std::process::ExitCode::FAILURE },
	};

	let input = if parsed_options.opt_present("demo") {
		Input::Demo
	} else {
		match parsed_options.free.get(1).map(String::as_str) {
			None | Some("-") => Input::Stdin,
			Some(p) => Input::File(std::path::PathBuf::from(p)),
		}
	};

	let output = parsed_options.opt_str("o")
		.map(std::path::PathBuf::from)
		.unwrap_or_else(|| std::path::PathBuf::from(fixenv::snapshot::DEFAULT_FILE_NAME));

	let config = fixenv::Config::load_from_disk().unwrap_or_else(|e| {
		log::warn!("Failed to read config file: {}", e);
		log::warn!("Using default config.");
		let mut config = fixenv::Config::default();
		config.apply_env_overrides();
		config
	});

	match run(&config, command, &input, parsed_options.opt_present("v"), &output).await {
		Ok(_) => std::process::ExitCode::SUCCESS,
		Err(e) => {
			log::error!("{}", e);
			std::process::ExitCode::FAILURE
		},
	}
}

const USAGE: &str = "Usage: fixenv [options] <detect|fix|explain|snapshot> [FILE|-]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
	/// List conflicting pins.
	Detect,
	/// Detect then preview the suggested fix.
	Fix,
	/// Detect, ask for an explanation, then preview the fix.
	Explain,
	/// As `Explain` then write the snapshot archive.
	Snapshot,
}

impl std::str::FromStr for Command {
	type Err = Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"detect" => Ok(Command::Detect),
			"fix" => Ok(Command::Fix),
			"explain" => Ok(Command::Explain),
			"snapshot" => Ok(Command::Snapshot),
			_ => Err(Error::UnknownCommand(s.to_string())),
		}
	}
}

enum Input {
	Demo,
	Stdin,
	File(std::path::PathBuf),
}

fn read_input(input: &Input) -> Result<String, Error> {
	match input {
		Input::Demo => Ok(DEMO_INPUT.to_string()),
		Input::Stdin => {
			log::trace!("Reading requirements from stdin");
			let mut s = String::new();
			std::io::stdin().read_to_string(&mut s)?;
			Ok(s)
		},
		Input::File(path) => {
			log::trace!("Reading requirements from {}", path.display());
			Ok(fixenv::requirements::read_requirements_file(path)?)
		},
	}
}

async fn run(config: &fixenv::Config, command: Command, input: &Input, verbose: bool, output: &std::path::Path) -> Result<(), Error> {
	let analysis = fixenv::Analysis::new(read_input(input)?);

	report_detection(&analysis, verbose);

	/* Everything past detection only makes sense with something to fix */
	if !analysis.has_conflicts() || command == Command::Detect {
		return Ok(());
	}

	if command == Command::Fix {
		print_fix(&analysis);
		return Ok(());
	}

	let explanation = match request_explanation(config, &analysis).await {
		Ok(e) => e,
		Err(e) => {
			println!("Explanation unavailable: {}", e);
			print_fix(&analysis);
			return if command == Command::Snapshot { Err(Error::NoExplanation) } else { Ok(()) };
		},
	};

	println!("AI Explanation");
	println!("{}", explanation.text());
	println!();
	print_fix(&analysis);

	if command == Command::Snapshot {
		let archive = analysis.snapshot(&explanation)?;
		std::fs::write(output, archive)?;
		log::info!("Wrote snapshot for input {}", analysis.fingerprint());
		println!("Snapshot written to {}", output.display());
	}

	Ok(())
}

fn report_detection(analysis: &fixenv::Analysis, verbose: bool) {
	if verbose {
		for skipped in analysis.skipped() {
			if let fixenv::requirements::LineOutcome::Skipped { line_number, text, reason } = skipped {
				println!("\tskipped line {} ({}): {}", line_number, reason, text);
			}
		}
	}

	if analysis.has_conflicts() {
		println!("Conflicts detected:");
		for conflict in analysis.conflicts() {
			println!("\t- {}", conflict);
		}
	} else {
		println!("No version conflicts detected!");
	}
}

fn print_fix(analysis: &fixenv::Analysis) {
	println!("Suggested fix preview");
	println!("{}", analysis.suggest_fix().diff_text);
}

async fn request_explanation(config: &fixenv::Config, analysis: &fixenv::Analysis) -> Result<fixenv::Explanation, fixenv::Error> {
	let client = fixenv::explain::ChatClient::new(config)?;
	println!("Contacting AI assistant ({})...", client.model());
	analysis.explain(&client).await
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("fixenv error: {0}")]
	FixEnvError(#[from] fixenv::Error),
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("Unknown command `{0}`")]
	UnknownCommand(String),
	#[error("No explanation to put in the snapshot")]
	NoExplanation,
}
