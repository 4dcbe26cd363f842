use clap::{value_parser, Arg, ArgMatches, Command};
use lattice::{
    shape2strides, strides2offset, zeros_from_json, zeros_like_json, ArrayMeta, Enforcer, NdArray,
    Strides,
};
use serde_json::Value;

pub fn start_logger(level: log::LevelFilter) {
    let logger = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply();
    match logger {
        Ok(_) => log::info!("Logging initialized."),
        Err(error) => eprintln!("Error initializing logging: {:?}", error),
    }
}

fn parse_json(matches: &ArgMatches, id: &str) -> anyhow::Result<Option<Value>> {
    matches
        .get_one::<String>(id)
        .map(|raw| {
            serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("`--{}` is not valid JSON ({}): {}", id, e, raw))
        })
        .transpose()
}

fn required_json(matches: &ArgMatches, id: &str) -> anyhow::Result<Value> {
    parse_json(matches, id)?.ok_or_else(|| anyhow::anyhow!("`--{}` is required", id))
}

fn render_array(array: &NdArray) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&array.summary())?)
}

fn handle_zeros(matches: &ArgMatches) -> anyhow::Result<String> {
    let dtype = matches.get_one::<String>("dtype").unwrap();
    let order = matches.get_one::<String>("order").unwrap();
    let shape = required_json(matches, "shape")?;
    let array = zeros_from_json(dtype, &shape, order)?;
    render_array(&array)
}

fn handle_like(matches: &ArgMatches) -> anyhow::Result<String> {
    let source = ArrayMeta::from_json(&required_json(matches, "source")?)?;
    let options = parse_json(matches, "options")?;
    let array = zeros_like_json(&source, options.as_ref())?;
    render_array(&array)
}

fn handle_strides(matches: &ArgMatches) -> anyhow::Result<String> {
    let shape = Enforcer::check_shape(&required_json(matches, "shape")?)?;
    let order = Enforcer::check_order(matches.get_one::<String>("order").unwrap())?;
    let strides = shape2strides(&shape, order);
    Ok(serde_json::to_string(&strides)?)
}

fn handle_offset(matches: &ArgMatches) -> anyhow::Result<String> {
    let shape = Enforcer::check_shape(&required_json(matches, "shape")?)?;
    let strides: Vec<isize> = serde_json::from_value(required_json(matches, "strides")?)?;
    let offset = strides2offset(&shape, &Strides::from(strides))?;
    Ok(offset.to_string())
}

fn run(matches: &ArgMatches) -> anyhow::Result<String> {
    match matches.subcommand() {
        Some(("zeros", matches)) => handle_zeros(matches),
        Some(("like", matches)) => handle_like(matches),
        Some(("strides", matches)) => handle_strides(matches),
        Some(("offset", matches)) => handle_offset(matches),
        Some((name, _)) => anyhow::bail!("unknown subcommand `{}`", name),
        None => anyhow::bail!("a subcommand is required"),
    }
}

fn shape_arg() -> Arg {
    Arg::new("shape")
        .short('s')
        .long("shape")
        .required(true)
        .help("Shape as JSON: a nonnegative integer or an array of them.")
}

fn order_arg() -> Arg {
    Arg::new("order")
        .short('o')
        .long("order")
        .default_value("row-major")
        .help("Memory order: row-major or column-major.")
}

fn cli() -> Command {
    Command::new("lattice")
        .about("Strided ndarray layout tool")
        .version("0.1.0")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("warn")
                .value_parser(value_parser!(log::LevelFilter))
                .help("Log level: off, error, warn, info, debug or trace."),
        )
        .subcommand(
            Command::new("zeros")
                .long_about("Create a zero-filled array and print its descriptor.")
                .arg(
                    Arg::new("dtype")
                        .short('d')
                        .long("dtype")
                        .default_value("float64")
                        .help("Data type tag, e.g. float64, int8, complex128, generic."),
                )
                .arg(shape_arg())
                .arg(order_arg()),
        )
        .subcommand(
            Command::new("like")
                .long_about("Create a zero-filled array shaped like a source descriptor.")
                .arg(
                    Arg::new("source")
                        .long("source")
                        .required(true)
                        .help("Source descriptor as JSON: {\"dtype\", \"shape\", \"order\"}."),
                )
                .arg(
                    Arg::new("options")
                        .long("options")
                        .help("Overrides as a JSON object with dtype, shape and/or order."),
                ),
        )
        .subcommand(
            Command::new("strides")
                .long_about("Print the standard strides of a shape.")
                .arg(shape_arg())
                .arg(order_arg()),
        )
        .subcommand(
            Command::new("offset")
                .long_about("Print the base offset implied by a shape and strides.")
                .arg(shape_arg())
                .arg(
                    Arg::new("strides")
                        .long("strides")
                        .required(true)
                        .help("Strides as a JSON array of integers."),
                ),
        )
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let level = *matches.get_one::<log::LevelFilter>("log-level").unwrap();
    start_logger(level);

    println!("{}", run(&matches)?);
    Ok(())
}
