use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use daftar::clipboard::{copy_snippet, CommandClipboard};
use daftar::config::Config;
use daftar::form::{self, Composer, PostForm};
use daftar::post::SystemClock;
use daftar::route::{resolve, Page, Route};
use daftar::util::read_text;
use daftar::view;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Default to info-level logs on stderr; override via RUST_LOG.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let matches = app().get_matches();
    let config = load_config(&matches)?;
    match matches.subcommand() {
        ("list", Some(_)) => show(&config, &Route::List),
        ("show", Some(sub)) => show(&config, &Route::Detail(value(sub, "id")?.to_owned())),
        ("route", Some(sub)) => {
            let path = value(sub, "path")?;
            match Route::parse(path) {
                Some(route) => show(&config, &route),
                None => Err(anyhow!("No route matches `{}`", path)),
            }
        }
        ("new", Some(sub)) => new_post(&config, sub),
        (name, _) => Err(anyhow!("Unknown command `{}`", name)),
    }
}

fn app() -> App<'static, 'static> {
    App::new("daftar")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tiny static blog: read posts and generate new ones for the seed file")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .global(true)
                .help("Project file (default: nearest daftar.yaml)"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .global(true)
                .help("Seed file with the posts (overrides the project file)"),
        )
        .subcommand(SubCommand::with_name("list").about("Lists all posts"))
        .subcommand(
            SubCommand::with_name("show")
                .about("Shows a single post")
                .arg(Arg::with_name("id").required(true).index(1)),
        )
        .subcommand(
            SubCommand::with_name("route")
                .about("Shows the page for a path such as `/` or `/post/{id}`")
                .arg(Arg::with_name("path").required(true).index(1)),
        )
        .subcommand(
            SubCommand::with_name("new")
                .about("Generates a snippet for a new post")
                .arg(Arg::with_name("title").long("title").takes_value(true))
                .arg(Arg::with_name("excerpt").long("excerpt").takes_value(true))
                .arg(
                    Arg::with_name("content")
                        .long("content")
                        .takes_value(true)
                        .conflicts_with("content-file"),
                )
                .arg(
                    Arg::with_name("content-file")
                        .long("content-file")
                        .takes_value(true)
                        .help("Reads the content from a file"),
                )
                .arg(
                    Arg::with_name("image-url")
                        .long("image-url")
                        .takes_value(true)
                        .help("Leave out to use a placeholder image"),
                )
                .arg(
                    Arg::with_name("copy")
                        .long("copy")
                        .help("Also copies the snippet to the clipboard"),
                ),
        )
}

fn value<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .value_of(name)
        .ok_or_else(|| anyhow!("Missing argument `{}`", name))
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_project_file(Path::new(path))?,
        None => Config::from_directory(&std::env::current_dir()?)?,
    };
    if let Some(seed) = matches.value_of("seed") {
        config.seed = Some(PathBuf::from(seed));
    }
    Ok(config)
}

fn show(config: &Config, route: &Route) -> Result<()> {
    let store = config.store()?;
    let page = resolve(&store, route);
    print!("{}", view::render(&page));
    if let Page::NotFound(_) = page {
        std::process::exit(2);
    }
    Ok(())
}

fn new_post(config: &Config, matches: &ArgMatches) -> Result<()> {
    let text = |name: &str| matches.value_of(name).unwrap_or_default().to_owned();
    let content = match matches.value_of("content-file") {
        Some(path) => read_text(Path::new(path), "content")?,
        None => text("content"),
    };

    let mut composer = Composer::new(config.builder(SystemClock));
    composer.form = PostForm {
        title: text("title"),
        excerpt: text("excerpt"),
        content,
        image_url: text("image-url"),
    };

    let snippet = match composer.submit() {
        Ok(snippet) => snippet.to_owned(),
        Err(form::Error::Validation(err)) => {
            for problem in &err.problems {
                eprintln!("  - {}", problem);
            }
            return Err(anyhow!("The post wasn't generated; fix the fields above"));
        }
        Err(err) => return Err(err.into()),
    };

    let seed = match &config.seed {
        Some(path) => path.display().to_string(),
        None => String::from("seed/posts.txt"),
    };
    print!("{}", view::snippet_instructions(&snippet, &seed));

    if matches.is_present("copy") {
        let indicator = config.copy_indicator();
        if copy_snippet(&mut CommandClipboard::default(), &indicator, &snippet) {
            composer.set_copied(true);
            eprintln!("Copied to the clipboard.");
        }
    }
    Ok(())
}
