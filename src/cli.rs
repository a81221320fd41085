use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use macdict_rs::{
    CommandSource, DictionaryCatalog, Extension, FallbackSource, InstalledDictionary,
    JsonFileStore, MarkupSource, OutboundMessage, PanelConfig, PanelHost, PanelOptions,
    PanelSurface, RenderPipeline, ViewColumn, XsltMarkupSource,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::json;
use tracing::debug;

const PATH_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Parser, Debug)]
#[command(
    name = "macdict",
    about = "Render definitions from the installed Mac dictionaries",
    version
)]
pub struct Cli {
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    /// State file holding the selected dictionary.
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Directory with the bundled `media/main.js` and `style.xsl`.
    #[arg(long, global = true)]
    extension: Option<PathBuf>,

    /// Program printing definition markup for `<dictionary> <word>`.
    #[arg(long, global = true, default_value = "macdict-lookup")]
    lookup_cmd: String,

    /// Program printing an XML entry for `<dictionary> <word>`, transformed
    /// with `style.xsl` when the lookup program fails.
    #[arg(long, global = true)]
    xml_cmd: Option<String>,

    /// XSLT processor used with `--xml-cmd`.
    #[arg(long, global = true)]
    xsltproc: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the hardened definition document for a word.
    Render {
        /// Word to look up; may be empty.
        #[arg(default_value = "")]
        word: String,
        /// Dictionary data file to use instead of the selected one.
        #[arg(long)]
        dict: Option<PathBuf>,
        /// Write the document here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List installed dictionaries.
    Dicts,
    /// Select the dictionary whose name contains NAME.
    Select {
        name: String,
    },
    /// Print the dictionary data path lookups will use.
    Path,
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    match &cli.command {
        Command::Render { word, dict, output } => {
            handle_render(&cli, config, word, dict.as_deref(), output.as_deref())
        }
        Command::Dicts => handle_dicts(&config, cli.json),
        Command::Select { name } => handle_select(&cli, config, name),
        Command::Path => handle_path(&cli, config),
    }
}

fn build_config(cli: &Cli) -> PanelConfig {
    let mut config = PanelConfig::default();
    if let Some(extension) = &cli.extension {
        config.extension_path = extension.clone();
    }
    if let Some(state) = &cli.state {
        config.state_path = state.clone();
    }
    if let Some(xsltproc) = &cli.xsltproc {
        config.xsltproc = xsltproc.clone();
    }
    config
}

fn build_pipeline(cli: &Cli, config: &PanelConfig) -> RenderPipeline {
    let primary = CommandSource::new(&cli.lookup_cmd);
    let source: Box<dyn MarkupSource> = match &cli.xml_cmd {
        Some(xml_cmd) => {
            let alternate =
                XsltMarkupSource::new(CommandSource::new(xml_cmd), config.template_path())
                    .with_program(&config.xsltproc);
            Box::new(FallbackSource::new(primary, alternate))
        }
        None => Box::new(primary),
    };
    RenderPipeline::new(source)
}

fn open_extension(
    cli: &Cli,
    config: PanelConfig,
    selection: Option<&str>,
) -> Result<Extension<HeadlessHost, JsonFileStore>, Box<dyn Error>> {
    let store = JsonFileStore::open(&config.state_path)?;
    let pipeline = build_pipeline(cli, &config);
    let host = HeadlessHost {
        selection: selection.map(str::to_string),
    };
    Ok(Extension::new(host, store, pipeline, config))
}

fn handle_render(
    cli: &Cli,
    config: PanelConfig,
    word: &str,
    dict: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let mut extension = open_extension(cli, config, None)?;
    match dict {
        Some(path) => extension.controller_mut().show(path, word),
        None => extension.start(word)?,
    }
    let controller = extension.controller();
    let html = controller
        .surface()
        .and_then(|surface| surface.html.clone())
        .ok_or("definition unavailable")?;
    let dictionary = controller
        .current_dictionary()
        .map(|path| path.display().to_string());

    if let Some(output) = output {
        fs::write(output, &html)?;
    }
    if cli.json {
        let written = output.map(|path| path.display().to_string());
        let inline = output.is_none().then_some(&html);
        let payload = json!({
            "word": word,
            "dictionary": dictionary,
            "bytes": html.len(),
            "output": written,
            "html": inline,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if output.is_none() {
        println!("{html}");
    }
    Ok(())
}

fn handle_dicts(config: &PanelConfig, as_json: bool) -> Result<(), Box<dyn Error>> {
    let catalog = DictionaryCatalog::discover(&config.asset_roots)?;
    let installed = catalog.installed()?;
    if as_json {
        let dictionaries: Vec<_> = installed
            .iter()
            .map(|dictionary| {
                json!({
                    "name": dictionary.name,
                    "data_path": dictionary.data_path().display().to_string(),
                })
            })
            .collect();
        let payload = json!({
            "root": catalog.root().display().to_string(),
            "dictionaries": dictionaries,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_dictionary_table(catalog.root(), &installed);
    }
    Ok(())
}

fn handle_select(cli: &Cli, config: PanelConfig, name: &str) -> Result<(), Box<dyn Error>> {
    let mut extension = open_extension(cli, config, Some(name))?;
    let dictionary = extension
        .select_dictionary()?
        .ok_or_else(|| format!("No installed dictionary matches {name:?}"))?;
    if cli.json {
        let payload = json!({
            "name": dictionary.name,
            "data_path": dictionary.data_path().display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }
    Ok(())
}

fn handle_path(cli: &Cli, config: PanelConfig) -> Result<(), Box<dyn Error>> {
    let mut extension = open_extension(cli, config, None)?;
    let path = extension
        .resolve_dictionary_path()?
        .ok_or("No dictionary installation found")?;
    if cli.json {
        let payload = json!({ "dictionary_path": path.display().to_string() });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

fn print_dictionary_table(root: &Path, rows: &[InstalledDictionary]) {
    if rows.is_empty() {
        println!("No dictionaries installed under {}.", root.display());
        return;
    }
    let width = rows
        .iter()
        .map(|dictionary| dictionary.name.len())
        .max()
        .unwrap_or(4)
        .max("NAME".len());
    println!("Dictionaries under {}:", root.display());
    println!("{:<width$}  {}", "NAME", "DATA", width = width);
    println!("{:-<width$}  {}", "", "----", width = width);
    for dictionary in rows {
        println!(
            "{:<width$}  {}",
            dictionary.name,
            dictionary.data_path().display(),
            width = width
        );
    }
}

/// Host without a window: documents are kept in memory and messages go to
/// stderr.
struct HeadlessHost {
    selection: Option<String>,
}

#[derive(Default)]
struct BufferedSurface {
    html: Option<String>,
}

impl PanelSurface for BufferedSurface {
    fn set_title(&mut self, title: &str) {
        debug!(title, "panel title");
    }

    fn set_html(&mut self, html: String) {
        self.html = Some(html);
    }

    fn reveal(&mut self, _column: Option<ViewColumn>) {}

    fn post_message(&mut self, message: &OutboundMessage) -> bool {
        debug!(?message, "no document listening");
        false
    }

    fn csp_source(&self) -> String {
        "file:".to_string()
    }

    fn resource_uri(&self, path: &Path) -> String {
        file_uri(path)
    }

    fn dispose(&mut self) {
        self.html = None;
    }
}

impl PanelHost for HeadlessHost {
    type Surface = BufferedSurface;

    fn create_panel(&mut self, options: &PanelOptions) -> BufferedSurface {
        debug!(view_type = %options.view_type, "creating headless panel");
        BufferedSurface::default()
    }

    fn has_active_editor(&self) -> bool {
        false
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("error: {message}");
    }

    fn show_info(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn quick_pick(&mut self, items: &[String], _placeholder: &str) -> Option<String> {
        let selection = self.selection.as_deref()?;
        items.iter().find(|item| item.contains(selection)).cloned()
    }
}

fn file_uri(path: &Path) -> String {
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    format!(
        "file://{}",
        utf8_percent_encode(&absolute.to_string_lossy(), PATH_ESCAPES)
    )
}
