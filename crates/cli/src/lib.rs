use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dossier_naming::{candidate_basenames, parse_code, similarity_stage, SimilarityConfig};
use dossier_resolver::{dossier_level_folders, FolderResolver, FolderSuggester};
use dossier_store::{FolderId, FolderStore};
use dossier_workflow::{
    bootstrap_refs, current_year, dossier_of_folder, folder_path, reassignment_warnings,
    AssignMode, AssignRequest, ContractBook, ContractId, ContractKind, DossierAssigner,
    DossierConfig, DossierState, DossierWorkspace,
};
use serde::Serialize;
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    print_stdout(&serde_json::to_string_pretty(value)?)
}

#[derive(Parser)]
#[command(name = "dossier")]
#[command(about = "Locate, create and link quality dossier folders", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Snapshot file holding folders, contracts and owners
    #[arg(long, global = true, default_value = "dossier.json")]
    store: PathBuf,

    /// TOML configuration (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Print results as JSON on stdout (implies --quiet)
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a contract code into prefix, type, digits, letter and revision
    Parse(CodeArgs),

    /// List the folder-name prefixes tried for a code, most specific first
    Candidates(CodeArgs),

    /// Run the similarity cascade of a name against targets
    Similar(SimilarArgs),

    /// Find the existing dossier folder for a code inside the workspace
    Resolve(CodeArgs),

    /// Rank dossier folders by fuzzy match against free text
    Suggest(SuggestArgs),

    /// Bind workspace identifiers to the existing folder tree
    Bootstrap(YearArgs),

    /// Create or link the dossier folder of a contract
    Assign(AssignArgs),

    /// Show reassignment warnings before linking an existing folder
    Warnings(WarningsArgs),

    /// Dossier folder that contains a folder or document
    #[command(name = "dossier-of")]
    DossierOf(DossierOfArgs),

    /// Show or change the dossier state of a contract
    State(StateArgs),
}

#[derive(Args)]
struct CodeArgs {
    /// Contract or quotation code
    code: String,
}

#[derive(Args)]
struct SimilarArgs {
    /// Name to compare
    name: String,

    /// Names to compare against
    #[arg(required = true)]
    targets: Vec<String>,

    /// Minimum edit-distance ratio for the last stage
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Args)]
struct SuggestArgs {
    /// Free-text query
    query: String,

    /// Maximum number of suggestions
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args)]
struct YearArgs {
    /// Year folder to ensure (defaults to the current year)
    #[arg(long)]
    year: Option<i32>,
}

#[derive(Args)]
struct AssignArgs {
    /// Contract name or numeric id
    contract: String,

    /// Link this existing folder instead of creating one
    #[arg(long, conflicts_with = "new")]
    existing: Option<u64>,

    /// Create a new dossier even when the principal already has one
    #[arg(long)]
    new: bool,

    /// Dossier folder name (defaults to the principal contract name)
    #[arg(long)]
    name: Option<String>,

    /// Principal contract for an addendum (name or id)
    #[arg(long)]
    principal: Option<String>,

    #[command(flatten)]
    year: YearArgs,
}

#[derive(Args)]
struct WarningsArgs {
    /// Contract name or numeric id
    contract: String,

    /// Folder to check (defaults to the folder the dialog would propose)
    #[arg(long)]
    existing: Option<u64>,
}

#[derive(Args)]
struct StateArgs {
    /// Contract name or numeric id
    contract: String,

    /// New state: suministro, en_proceso, enviado or aprobado
    state: Option<String>,
}

#[derive(Args)]
struct DossierOfArgs {
    /// Folder id, or document id with --document
    id: u64,

    /// Treat the id as a document id
    #[arg(long)]
    document: bool,
}

pub fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON parsing
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Parse(args) => run_parse(&cli, args)?,
        Commands::Candidates(args) => run_candidates(&cli, args)?,
        Commands::Similar(args) => run_similar(&cli, args, &config)?,
        Commands::Resolve(args) => run_resolve(&cli, args, &config)?,
        Commands::Suggest(args) => run_suggest(&cli, args, &config)?,
        Commands::Bootstrap(args) => run_bootstrap(&cli, args, &config)?,
        Commands::Assign(args) => run_assign(&cli, args, &config)?,
        Commands::Warnings(args) => run_warnings(&cli, args)?,
        Commands::DossierOf(args) => run_dossier_of(&cli, args, &config)?,
        Commands::State(args) => run_state(&cli, args)?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DossierConfig> {
    match path {
        Some(path) => DossierConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(DossierConfig::default()),
    }
}

fn load_workspace(path: &Path) -> Result<DossierWorkspace> {
    DossierWorkspace::load(path)
        .with_context(|| format!("Failed to load snapshot {}", path.display()))
}

fn save_workspace(workspace: &DossierWorkspace, path: &Path) -> Result<()> {
    workspace
        .save(path)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))
}

/// Contract by exact name, falling back to a numeric id.
fn find_contract(book: &ContractBook, key: &str) -> Result<ContractId> {
    if let Some(contract) = book.find_by_name(key) {
        return Ok(contract.id);
    }
    let id = key
        .trim()
        .trim_start_matches('#')
        .parse::<u64>()
        .map_err(|_| anyhow!("Unknown contract '{key}'"))?;
    Ok(book.get(ContractId(id))?.id)
}

fn run_parse(cli: &Cli, args: &CodeArgs) -> Result<()> {
    let parsed = parse_code(&args.code);
    if cli.json {
        return print_json(&parsed);
    }
    match parsed {
        Some(code) => {
            print_stdout(&format!("prefix: {}", code.prefix.as_deref().unwrap_or("-")))?;
            print_stdout(&format!("type:   {}", code.kind))?;
            print_stdout(&format!("digits: {}", code.digits))?;
            print_stdout(&format!("letter: {}", code.letter.as_deref().unwrap_or("-")))?;
            print_stdout(&format!("rev:    {}", code.rev.as_deref().unwrap_or("-")))?;
        }
        None => eprintln!("'{}' is not a structured contract code", args.code),
    }
    Ok(())
}

fn run_candidates(cli: &Cli, args: &CodeArgs) -> Result<()> {
    let candidates = candidate_basenames(&args.code);
    if cli.json {
        return print_json(&candidates);
    }
    for candidate in &candidates {
        print_stdout(candidate)?;
    }
    Ok(())
}

fn run_similar(cli: &Cli, args: &SimilarArgs, config: &DossierConfig) -> Result<()> {
    let similarity = match args.threshold {
        Some(threshold) => SimilarityConfig::with_threshold(threshold),
        None => FolderResolver::new(config.resolver.clone()).similarity(),
    };
    let stage = similarity_stage(&args.name, args.targets.as_slice(), &similarity);

    if cli.json {
        return print_json(&json!({
            "similar": stage.is_some(),
            "stage": stage,
            "threshold": similarity.fuzzy_threshold,
        }));
    }
    match stage {
        Some(stage) => print_stdout(&format!("similar ({})", stage.as_str())),
        None => print_stdout("not similar"),
    }
}

fn run_resolve(cli: &Cli, args: &CodeArgs, config: &DossierConfig) -> Result<()> {
    let workspace = load_workspace(&cli.store)?;
    let resolver = FolderResolver::new(config.resolver.clone());
    let resolution = resolver.resolve(&workspace.store, &args.code)?;

    if cli.json {
        let path = match &resolution {
            Some(r) => Some(folder_path(&workspace.store, r.folder.id)?),
            None => None,
        };
        return print_json(&json!({ "resolution": resolution, "path": path }));
    }
    match resolution {
        Some(resolution) => {
            print_stdout(&folder_path(&workspace.store, resolution.folder.id)?)?;
            log::info!("Matched folder {} ({:?})", resolution.folder.id, resolution.source);
        }
        None => eprintln!("No existing dossier folder for '{}'", args.code),
    }
    Ok(())
}

fn run_suggest(cli: &Cli, args: &SuggestArgs, config: &DossierConfig) -> Result<()> {
    let workspace = load_workspace(&cli.store)?;
    let resolver = FolderResolver::new(config.resolver.clone());
    let scope = resolver.scope(&workspace.store)?;
    let limit = args.limit.unwrap_or(config.resolver.suggest_limit);

    let candidates = dossier_level_folders(&workspace.store, &scope)?;
    let suggestions = FolderSuggester::new().rank(&args.query, candidates, limit);

    if cli.json {
        return print_json(&suggestions);
    }
    for suggestion in &suggestions {
        print_stdout(&format!(
            "{:.2}  {}  {}",
            suggestion.score,
            suggestion.folder.id,
            folder_path(&workspace.store, suggestion.folder.id)?
        ))?;
    }
    Ok(())
}

fn run_bootstrap(cli: &Cli, args: &YearArgs, config: &DossierConfig) -> Result<()> {
    let mut workspace = load_workspace(&cli.store)?;
    let year = args.year.unwrap_or_else(current_year);
    let report = bootstrap_refs(&mut workspace.store, config, year)?;
    save_workspace(&workspace, &cli.store)?;

    if cli.json {
        return print_json(&report);
    }
    match report.root {
        Some(root) => {
            print_stdout(&format!("root: {}", folder_path(&workspace.store, root)?))?;
            for xml_id in &report.bound {
                print_stdout(&format!("bound {xml_id}"))?;
            }
        }
        None => eprintln!("No workspace root folder found; nothing bound"),
    }
    Ok(())
}

fn build_request(
    book: &ContractBook,
    contract: &str,
    existing: Option<u64>,
    new: bool,
    principal: Option<&str>,
    name: Option<&str>,
) -> Result<AssignRequest> {
    let contract = find_contract(book, contract)?;
    let mut request = AssignRequest::defaults(book, contract)?;

    if let Some(principal) = principal {
        request.kind = ContractKind::Addendum;
        request.principal = Some(find_contract(book, principal)?);
    }
    if let Some(folder) = existing {
        request.mode = AssignMode::Existing(FolderId(folder));
    } else if new {
        request.mode = AssignMode::New;
    }
    if let Some(name) = name {
        request.folder_name = Some(name.to_string());
    }
    Ok(request)
}

fn run_assign(cli: &Cli, args: &AssignArgs, config: &DossierConfig) -> Result<()> {
    let mut workspace = load_workspace(&cli.store)?;
    let request = build_request(
        &workspace.book,
        &args.contract,
        args.existing,
        args.new,
        args.principal.as_deref(),
        args.name.as_deref(),
    )?;

    let warnings = reassignment_warnings(&workspace.store, &workspace.book, &request)?;
    for warning in &warnings {
        log::warn!("{warning}");
    }

    let year = args.year.year.unwrap_or_else(current_year);
    let outcome = DossierAssigner::new(config).confirm(
        &mut workspace.store,
        &mut workspace.book,
        &workspace.owners,
        &request,
        year,
    )?;
    save_workspace(&workspace, &cli.store)?;

    if cli.json {
        return print_json(&json!({ "outcome": outcome, "warnings": warnings }));
    }
    let action = match (outcome.created, outcome.matched) {
        (true, _) => "created",
        (false, true) => "matched",
        (false, false) => "linked",
    };
    print_stdout(&format!("{action}: {}", outcome.path))?;
    if let Some(structure) = &outcome.structure {
        print_stdout(&format!(
            "structure: {} folders created, {} reused, {} requests",
            structure.folders_created, structure.folders_reused, structure.requests_created
        ))?;
    }
    Ok(())
}

fn run_warnings(cli: &Cli, args: &WarningsArgs) -> Result<()> {
    let workspace = load_workspace(&cli.store)?;
    let request = build_request(
        &workspace.book,
        &args.contract,
        args.existing,
        false,
        None,
        None,
    )?;
    if request.mode == AssignMode::New {
        bail!("Contract '{}' has no folder to link; pass --existing", args.contract);
    }

    let warnings = reassignment_warnings(&workspace.store, &workspace.book, &request)?;
    if cli.json {
        return print_json(&warnings);
    }
    if warnings.is_empty() {
        print_stdout("no warnings")?;
    }
    for warning in &warnings {
        print_stdout(&warning.to_string())?;
    }
    Ok(())
}

fn run_dossier_of(cli: &Cli, args: &DossierOfArgs, config: &DossierConfig) -> Result<()> {
    let workspace = load_workspace(&cli.store)?;
    let folder = if args.document {
        workspace
            .store
            .document(args.id)
            .map(|doc| doc.folder)
            .ok_or_else(|| anyhow!("Document {} not found", args.id))?
    } else {
        FolderId(args.id)
    };
    if workspace.store.folder(folder)?.is_none() {
        bail!("Folder {folder} not found");
    }

    let scope = FolderResolver::new(config.resolver.clone()).scope(&workspace.store)?;
    let dossier = dossier_of_folder(&workspace.store, scope.root, folder)?;

    if cli.json {
        return print_json(&dossier);
    }
    match dossier {
        Some(dossier) => print_stdout(&folder_path(&workspace.store, dossier.id)?),
        None => {
            eprintln!("Folder {folder} is not inside a dossier");
            Ok(())
        }
    }
}

fn run_state(cli: &Cli, args: &StateArgs) -> Result<()> {
    let mut workspace = load_workspace(&cli.store)?;
    let id = find_contract(&workspace.book, &args.contract)?;

    if let Some(raw) = &args.state {
        let state: DossierState = raw.parse()?;
        workspace.book.set_state(id, state)?;
        save_workspace(&workspace, &cli.store)?;
        log::info!("Contract {id} dossier state set to {state}");
    }

    let contract = workspace.book.get(id)?;
    if cli.json {
        return print_json(&json!({
            "contract": contract.name,
            "state": contract.dossier_state,
        }));
    }
    print_stdout(&format!("{}: {}", contract.name, contract.dossier_state))
}
