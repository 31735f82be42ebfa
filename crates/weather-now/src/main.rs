use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use weather_now::{
    config::RuntimeConfig,
    error::{AppError, ErrorKind},
    locator::{CachedLocator, DeviceLocator, LocationOptions, SystemLocator},
    logging,
    model::normalize_query,
    presenter::{DisplayState, PLACEHOLDER},
    providers::{HttpProviders, ProviderApi},
    session::SessionController,
    status::StatusKind,
    units::DisplayUnit,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Current weather and 7-day forecast (free no-token APIs)")]
struct Cli {
    /// Display unit; metric unless set.
    #[arg(long, value_enum, global = true)]
    unit: Option<UnitArg>,
    #[arg(long, value_enum, global = true)]
    output: Option<OutputModeArg>,
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Detect the device location and show its weather.
    Now,
    /// Explicitly request the device location and show its weather.
    Locate,
    /// Search a place by name and show its weather.
    Search { query: String },
    /// Start with the device location, then read commands from stdin.
    Interactive,
}

const ENVELOPE_SCHEMA_VERSION: &str = "v1";
const ERROR_CODE_USER_INVALID_INPUT: &str = "user.invalid_input";
const ERROR_CODE_USER_OUTPUT_MODE_CONFLICT: &str = "user.output_mode_conflict";
const ERROR_CODE_RUNTIME_PROVIDER_INIT: &str = "runtime.provider_init_failed";
const ERROR_CODE_RUNTIME_SERIALIZE: &str = "runtime.serialize_failed";
const ERROR_CODE_RUNTIME_IO: &str = "runtime.io_failed";

const REPL_HELP: &str = "commands: unit | locate | search <place> | show | help | quit\n\
                         any other text is searched as a place name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UnitArg {
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputModeArg {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliOutputMode {
    Human,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliError {
    kind: ErrorKind,
    code: &'static str,
    message: String,
}

impl CliError {
    fn user(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::User,
            code,
            message: message.into(),
        }
    }

    fn runtime(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            code,
            message: message.into(),
        }
    }

    fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::User => 2,
            ErrorKind::Runtime => 1,
        }
    }
}

impl From<OutputModeArg> for CliOutputMode {
    fn from(value: OutputModeArg) -> Self {
        match value {
            OutputModeArg::Human => CliOutputMode::Human,
            OutputModeArg::Json => CliOutputMode::Json,
        }
    }
}

impl Cli {
    fn command_name(&self) -> &'static str {
        match &self.command {
            Commands::Now => "weather.now",
            Commands::Locate => "weather.locate",
            Commands::Search { .. } => "weather.search",
            Commands::Interactive => "weather.interactive",
        }
    }

    fn output_mode_hint(&self) -> CliOutputMode {
        if self.json {
            CliOutputMode::Json
        } else if let Some(explicit) = self.output {
            explicit.into()
        } else {
            CliOutputMode::Human
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Unit,
    Locate,
    Search(String),
    Show,
    Help,
    Quit,
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let command = cli.command_name();
    let output_mode = cli.output_mode_hint();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    match run(cli, stdin.lock(), &mut stdout) {
        Ok(kind) => std::process::exit(status_exit_code(kind)),
        Err(error) => {
            emit_error(command, output_mode, &error);
            std::process::exit(error.exit_code());
        }
    }
}

fn run<R: BufRead, W: Write>(cli: Cli, input: R, output: &mut W) -> Result<StatusKind, CliError> {
    let config = RuntimeConfig::from_env();
    let providers = HttpProviders::new()
        .map_err(|error| runtime_error(ERROR_CODE_RUNTIME_PROVIDER_INIT, error.to_string()))?;
    let locator = CachedLocator::new(SystemLocator::from_config(
        &config,
        providers.client().clone(),
    ));

    run_with(
        cli,
        &providers,
        locator,
        LocationOptions::from_config(&config),
        input,
        output,
    )
}

fn run_with<P, L, R, W>(
    cli: Cli,
    providers: P,
    locator: L,
    options: LocationOptions,
    input: R,
    output: &mut W,
) -> Result<StatusKind, CliError>
where
    P: ProviderApi,
    L: DeviceLocator,
    R: BufRead,
    W: Write,
{
    let command = cli.command_name();
    let output_mode = resolve_output_mode(cli.output, cli.json, CliOutputMode::Human)?;
    let search_query = match &cli.command {
        Commands::Search { query } => {
            Some(normalize_query(query).map_err(|error| map_app_error(error.into()))?)
        }
        _ => None,
    };

    let mut controller =
        SessionController::new(providers, locator, DisplayState::default(), options);
    if cli.unit == Some(UnitArg::Imperial) {
        controller.on_toggle_unit();
    }

    match cli.command {
        Commands::Now => controller.start(),
        Commands::Locate => controller.on_request_location(),
        Commands::Search { .. } => {
            if let Some(query) = search_query {
                controller.on_search(&query);
            }
        }
        Commands::Interactive => {
            return run_interactive(command, output_mode, &mut controller, input, output);
        }
    }

    write_view(command, output_mode, &controller, output)?;
    Ok(controller.session().status.kind)
}

fn run_interactive<P, L, R, W>(
    command: &str,
    output_mode: CliOutputMode,
    controller: &mut SessionController<P, L, DisplayState>,
    input: R,
    output: &mut W,
) -> Result<StatusKind, CliError>
where
    P: ProviderApi,
    L: DeviceLocator,
    R: BufRead,
    W: Write,
{
    controller.start();
    write_view(command, output_mode, controller, output)?;

    for line in input.lines() {
        let line = line.map_err(|error| {
            runtime_error(ERROR_CODE_RUNTIME_IO, format!("failed to read input: {error}"))
        })?;

        match parse_repl_line(&line) {
            None => continue,
            Some(ReplCommand::Quit) => break,
            Some(ReplCommand::Help) => {
                if output_mode == CliOutputMode::Human {
                    write_line(output, REPL_HELP)?;
                }
                continue;
            }
            Some(ReplCommand::Show) => {}
            Some(ReplCommand::Unit) => controller.on_toggle_unit(),
            Some(ReplCommand::Locate) => controller.on_request_location(),
            Some(ReplCommand::Search(query)) => controller.on_search(&query),
        }
        write_view(command, output_mode, controller, output)?;
    }

    // Leaving the loop is a normal exit whatever the last status was.
    Ok(StatusKind::Neutral)
}

fn parse_repl_line(line: &str) -> Option<ReplCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (head, rest) = line
        .split_once(char::is_whitespace)
        .map(|(head, rest)| (head, rest.trim()))
        .unwrap_or((line, ""));

    let command = match (head.to_ascii_lowercase().as_str(), rest.is_empty()) {
        ("unit" | "u", true) => ReplCommand::Unit,
        ("locate" | "l", true) => ReplCommand::Locate,
        ("show" | "s", true) => ReplCommand::Show,
        ("help" | "h" | "?", true) => ReplCommand::Help,
        ("quit" | "q" | "exit", true) => ReplCommand::Quit,
        ("search", _) => ReplCommand::Search(rest.to_string()),
        _ => ReplCommand::Search(line.to_string()),
    };
    Some(command)
}

fn resolve_output_mode(
    output: Option<OutputModeArg>,
    json_flag: bool,
    default_mode: CliOutputMode,
) -> Result<CliOutputMode, CliError> {
    match (output.map(Into::into), json_flag) {
        (Some(mode), true) if mode != CliOutputMode::Json => Err(user_error(
            ERROR_CODE_USER_OUTPUT_MODE_CONFLICT,
            format!(
                "conflicting output flags: --json requires --output json (got {})",
                output_mode_label(mode)
            ),
        )),
        (Some(mode), _) => Ok(mode),
        (None, true) => Ok(CliOutputMode::Json),
        (None, false) => Ok(default_mode),
    }
}

fn write_view<P, L, W>(
    command: &str,
    output_mode: CliOutputMode,
    controller: &SessionController<P, L, DisplayState>,
    output: &mut W,
) -> Result<(), CliError>
where
    P: ProviderApi,
    L: DeviceLocator,
    W: Write,
{
    let unit = controller.session().unit;
    let rendered = match output_mode {
        CliOutputMode::Json => render_json_envelope(command, unit, controller.surface())?,
        CliOutputMode::Human => format_text_output(controller.surface()),
    };
    write_line(output, &rendered)
}

fn write_line<W: Write>(output: &mut W, text: &str) -> Result<(), CliError> {
    writeln!(output, "{text}")
        .and_then(|()| output.flush())
        .map_err(|error| runtime_error(ERROR_CODE_RUNTIME_IO, format!("failed to write output: {error}")))
}

fn render_json_envelope(
    command: &str,
    unit: DisplayUnit,
    display: &DisplayState,
) -> Result<String, CliError> {
    let display = serde_json::to_value(display).map_err(|error| {
        runtime_error(
            ERROR_CODE_RUNTIME_SERIALIZE,
            format!("failed to serialize output: {error}"),
        )
    })?;
    serde_json::to_string(&json!({
        "schema_version": ENVELOPE_SCHEMA_VERSION,
        "command": command,
        "ok": true,
        "result": {
            "unit": unit,
            "display": display,
        },
    }))
    .map_err(|error| {
        runtime_error(
            ERROR_CODE_RUNTIME_SERIALIZE,
            format!("failed to serialize output envelope: {error}"),
        )
    })
}

fn emit_error(command: &str, output_mode: CliOutputMode, error: &CliError) {
    match output_mode {
        CliOutputMode::Json => {
            let payload = json!({
                "schema_version": ENVELOPE_SCHEMA_VERSION,
                "command": command,
                "ok": false,
                "error": {
                    "code": error.code,
                    "message": error.message,
                    "details": {
                        "kind": error_kind_label(error.kind),
                        "exit_code": error.exit_code(),
                    }
                }
            });
            let rendered = serde_json::to_string(&payload).unwrap_or_else(|serialize_error| {
                format!(
                    "{{\"schema_version\":\"{}\",\"command\":\"{}\",\"ok\":false,\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
                    ENVELOPE_SCHEMA_VERSION,
                    command,
                    ERROR_CODE_RUNTIME_SERIALIZE,
                    escape_json_string(&format!(
                        "failed to serialize error envelope: {serialize_error}"
                    )),
                )
            });
            println!("{rendered}");
        }
        CliOutputMode::Human => {
            eprintln!("error[{}]: {}", error.code, error.message);
        }
    }
}

fn user_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError::user(code, message)
}

fn runtime_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError::runtime(code, message)
}

fn map_app_error(error: AppError) -> CliError {
    match error.kind {
        ErrorKind::User => user_error(ERROR_CODE_USER_INVALID_INPUT, error.message),
        ErrorKind::Runtime => runtime_error(ERROR_CODE_RUNTIME_IO, error.message),
    }
}

fn status_exit_code(kind: StatusKind) -> i32 {
    match kind {
        StatusKind::Ok | StatusKind::Neutral => 0,
        StatusKind::Warn => 2,
        StatusKind::Bad => 1,
    }
}

fn error_kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::User => "user",
        ErrorKind::Runtime => "runtime",
    }
}

fn output_mode_label(mode: CliOutputMode) -> &'static str {
    match mode {
        CliOutputMode::Human => "human",
        CliOutputMode::Json => "json",
    }
}

fn escape_json_string(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c < '\u{20}' => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

fn format_text_output(display: &DisplayState) -> String {
    let mut lines = Vec::new();

    if display.has_weather() {
        let slot = |value: &Option<String>| value.clone().unwrap_or_else(|| PLACEHOLDER.to_string());

        lines.push(slot(&display.place));
        lines.push(format!(
            "{}  {}",
            slot(&display.temperature),
            slot(&display.condition)
        ));
        lines.push(format!(
            "feels like {} | humidity {} | wind {} | uv {}",
            slot(&display.feels_like),
            slot(&display.humidity),
            slot(&display.wind),
            slot(&display.uv)
        ));
        lines.push(format!("updated {}", slot(&display.updated)));
        lines.push(String::new());

        for tile in &display.forecast {
            lines.push(format!(
                "{}  {} {}  {}  {}",
                tile.day, tile.icon, tile.temperature, tile.label, tile.precipitation
            ));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "[{}] {}",
        display.status.kind.as_str(),
        display.status.message
    ));
    lines.join("\n")
}
