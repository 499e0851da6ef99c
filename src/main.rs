use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use owo_colors::OwoColorize;

use threatflow::adapters::outbound::console::StderrProgressReporter;
use threatflow::adapters::outbound::network::{GraphQlThreatModelApi, SseDiagramEvents};
use threatflow::adapters::outbound::storage::{CachingObjectStore, HttpObjectStore};
use threatflow::application::dto::CreateDiagramRequest;
use threatflow::application::use_cases::{DiagramWorkflow, ListDiagramsUseCase, ThreatActionDialog};
use threatflow::cli::{Args, Command};
use threatflow::config::{discover_config, load_config_from_path, Settings};
use threatflow::ports::outbound::ProgressReporter;
use threatflow::shared::{ExitCode, Result, WorkflowError};
use threatflow::threat_model::domain::{DiagramStatus, DiagramSummary, FlattenedThreat};
use threatflow::threat_model::policies::DreadBand;

type Workflow = DiagramWorkflow<
    GraphQlThreatModelApi,
    SseDiagramEvents,
    CachingObjectStore<HttpObjectStore>,
    Arc<StderrProgressReporter>,
>;

fn main() {
    if let Err(e) = run() {
        eprintln!("\n❌ An error occurred:\n");
        eprintln!("{}", e);

        // Display error chain
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("\nCaused by: {}", err);
            source = err.source();
        }

        eprintln!();
        process::exit(ExitCode::ApplicationError.as_i32());
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse_args();

    let config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => discover_config(Path::new("."))?.unwrap_or_default(),
    };
    let settings = Settings::resolve(
        config,
        args.api_endpoint.clone(),
        args.api_key.clone(),
        args.storage_endpoint.clone(),
    )?;

    // Listing needs no workflow state, so it gets its own thin use case.
    if let Command::List = args.command {
        let api = GraphQlThreatModelApi::new(
            settings.api_endpoint.clone(),
            settings.api_key.clone(),
        )?;
        let summaries = ListDiagramsUseCase::new(api).execute().await?;
        print_diagram_list(&summaries);
        return Ok(());
    }

    // Commands that never touch the object store still get a working
    // adapter, pointed at the API host as a stand-in.
    let storage_endpoint = match &args.command {
        Command::Create { .. } | Command::Report { .. } => {
            settings.require_storage_endpoint()?.to_string()
        }
        _ => settings
            .storage_endpoint
            .clone()
            .unwrap_or_else(|| settings.api_endpoint.clone()),
    };

    let api = GraphQlThreatModelApi::new(settings.api_endpoint.clone(), settings.api_key.clone())?;
    let events = SseDiagramEvents::new(settings.api_endpoint.clone(), settings.api_key.clone())?;
    let store = CachingObjectStore::new(HttpObjectStore::new(
        storage_endpoint,
        settings.api_key.clone(),
    )?);
    let reporter = Arc::new(StderrProgressReporter::new());

    let mut workflow = DiagramWorkflow::new(
        api,
        events,
        store,
        Arc::clone(&reporter),
        settings.failure_policy,
    );

    match args.command {
        Command::List => unreachable!("handled above"),
        Command::Show {
            id,
            component,
            threat_type,
        } => {
            workflow.load(&id).await?;
            if let Some(component_id) = component {
                workflow.toggle_component_filter(&component_id);
            }
            workflow.set_threat_type_filter(threat_type);
            print_diagram(&workflow)?;
            if settings.storage_endpoint.is_some() {
                match workflow.diagram_image_url(settings.presign_expiry).await {
                    Ok(url) => println!("\n🖼  Diagram image (short-lived link): {}", url),
                    Err(error) => {
                        eprintln!("⚠️  Could not presign the diagram image: {}", error)
                    }
                }
            }
        }
        Command::Create { image, description } => {
            create_diagram(&mut workflow, reporter, image, description).await?;
        }
        Command::Extract { id, yes } => {
            extract_components(&mut workflow, &id, yes).await?;
        }
        Command::Generate { id, threat_types } => {
            workflow.load(&id).await?;
            if !threat_types.is_empty() {
                workflow.set_generation_types(&threat_types)?;
            }
            let job = workflow.begin_threat_generation().await?;
            workflow.run_generation(job).await?;
            print_diagram(&workflow)?;
        }
        Command::Act {
            id,
            component,
            threat,
            action,
            reason,
        } => {
            workflow.load(&id).await?;
            let dialog = workflow.open_threat_action(&component, &threat, action)?;
            let reason = match reason {
                Some(reason) => reason,
                None => prompt_reason(&dialog)?,
            };
            workflow.submit_threat_action(&dialog, reason).await?;
            println!(
                "✅ Recorded {} for threat {} on component {}",
                action.to_string().bold(),
                threat,
                component
            );
        }
        Command::DeleteComponents {
            id,
            components,
            yes,
        } => {
            delete_components(&mut workflow, &id, &components, yes).await?;
        }
        Command::Report { id, output } => {
            export_report(&mut workflow, &id, output).await?;
        }
    }

    Ok(())
}

async fn create_diagram(
    workflow: &mut Workflow,
    reporter: Arc<StderrProgressReporter>,
    image: PathBuf,
    description: String,
) -> Result<()> {
    let bytes = std::fs::read(&image).map_err(|e| WorkflowError::UploadError {
        path: image.display().to_string(),
        details: e.to_string(),
    })?;

    let upload_reporter = Arc::clone(&reporter);
    let on_progress = Box::new(move |sent: u64, total: u64| {
        upload_reporter.report_progress(sent as usize, total as usize, Some("uploading"));
    });

    let request = CreateDiagramRequest::new(image, description);
    let mut job = workflow
        .begin_create_diagram(request, bytes, on_progress)
        .await?;
    println!("🆔 Diagram id: {}", job.diagram_id().bold());

    reporter.report("Waiting for the diagram description...");
    let description = match job.await_description().await {
        Ok(description) => description,
        Err(error) => {
            workflow.description_failed(&mut job, &error.to_string());
            return Err(error);
        }
    };
    workflow.apply_description(description.clone())?;

    println!("\n📝 {}", "Description".bold());
    println!("{}", description);
    Ok(())
}

async fn extract_components(workflow: &mut Workflow, id: &str, yes: bool) -> Result<()> {
    workflow.load(id).await?;

    let confirmed = if workflow.requires_reextract_confirmation()? {
        yes || confirm(
            "Components already exist; extracting again appends and may duplicate them. Continue?",
        )?
    } else {
        true
    };

    let Some(mut job) = workflow.begin_extraction(confirmed).await? else {
        println!("Extraction cancelled.");
        return Ok(());
    };

    let components = job.await_components().await?;
    workflow.apply_extracted_components(components)?;
    print_diagram(workflow)?;
    Ok(())
}

async fn delete_components(
    workflow: &mut Workflow,
    id: &str,
    components: &[String],
    yes: bool,
) -> Result<()> {
    workflow.load(id).await?;
    workflow.toggle_bulk_mode();

    for component_id in components {
        workflow.toggle_bulk_selection(component_id)?;
        if !workflow.bulk_selection().is_selected(component_id) {
            eprintln!(
                "⚠️  Skipping '{}': unknown component, or it still has threats",
                component_id
            );
        }
    }

    let selected = workflow.bulk_selection().len();
    if selected == 0 {
        println!("Nothing to delete.");
        return Ok(());
    }

    if !yes && !confirm(&format!("Delete {} component(s)?", selected))? {
        println!("Deletion cancelled.");
        return Ok(());
    }

    let removed = workflow.confirm_bulk_delete().await?;
    for component_id in &removed {
        println!("🗑️  Removed component {}", component_id);
    }
    Ok(())
}

async fn export_report(
    workflow: &mut Workflow,
    id: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    workflow.load(id).await?;
    let report = workflow.generate_report().await?;
    let bytes = workflow.download_report(&report).await?;

    let path = output.unwrap_or_else(|| PathBuf::from(report.suggested_filename()));
    std::fs::write(&path, bytes).map_err(|e| WorkflowError::FileWriteError {
        path: path.clone(),
        details: e.to_string(),
    })?;

    println!("📄 Report saved to {}", path.display().to_string().bold());
    println!("🔗 Presigned link (short-lived): {}", report.presigned_url);
    Ok(())
}

fn print_diagram_list(summaries: &[DiagramSummary]) {
    if summaries.is_empty() {
        println!("No diagrams yet. Create one with `threatflow create <image>`.");
        return;
    }

    println!("{}", "Diagrams".bold());
    for summary in summaries {
        let status = summary
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| DiagramStatus::NotStarted.to_string());
        let description = summary
            .user_description
            .as_deref()
            .or(summary.diagram_description.as_deref())
            .unwrap_or("");
        println!(
            "  {}  [{}]  {}",
            summary.id.bold(),
            status,
            truncated(description, 60)
        );
    }
}

fn print_diagram(workflow: &Workflow) -> Result<()> {
    let state = workflow.current().ok_or_else(|| WorkflowError::Validation {
        message: "no diagram loaded; load or create one first".to_string(),
    })?;
    let diagram = state.diagram();

    println!("{} {}", "Diagram".bold(), diagram.id.bold());
    let status = diagram
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| DiagramStatus::NotStarted.to_string());
    println!("   status: {}", status);
    if !diagram.user_description.is_empty() {
        println!("   note:   {}", diagram.user_description);
    }
    if let Some(description) = &diagram.diagram_description {
        println!("\n📝 {}", "Description".bold());
        println!("{}", description);
    }

    let components = state.sorted_components();
    println!("\n🧩 {} ({})", "Components".bold(), components.len());
    for component in &components {
        println!(
            "   {}  {:<14} {}  ({} threats)",
            component.id.bold(),
            component.component_type.to_string(),
            component.name,
            state.threat_count_for(&component.id)
        );
    }

    let threats = workflow.filtered_threats()?;
    let heading = if workflow.filter().is_active() {
        format!("Threats ({} matching)", threats.len())
    } else {
        format!("Threats ({})", threats.len())
    };
    println!("\n⚡ {}", heading.bold());
    print_threats(&threats);
    Ok(())
}

fn print_threats(threats: &[&FlattenedThreat]) {
    for flattened in threats {
        let threat = &flattened.threat;
        let band = DreadBand::for_scores(&threat.dread_scores);
        println!(
            "   {} {}  {:<22} {}  (on {})",
            colored_band(band),
            threat.id.bold(),
            threat.threat_type.to_string(),
            threat.name,
            flattened.component_id
        );
        if let Some(action) = threat.action {
            let reason = threat.reason.as_deref().unwrap_or("");
            println!("              ↳ {}: {}", action, reason);
        }
    }
}

fn colored_band(band: DreadBand) -> String {
    let padded = format!("[{:<8}]", band.label());
    match band {
        DreadBand::Low => padded.green().to_string(),
        DreadBand::Moderate => padded.yellow().to_string(),
        DreadBand::High => padded.red().to_string(),
    }
}

fn truncated(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [y/N]: ", question);
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| WorkflowError::Validation {
            message: format!("could not read confirmation: {}", e),
        })?;
    Ok(parse_confirmation(&line))
}

fn prompt_reason(dialog: &ThreatActionDialog) -> Result<String> {
    match &dialog.prefilled_reason {
        Some(prefill) => eprint!("{} [{}]: ", dialog.prompt, prefill),
        None => eprint!("{}: ", dialog.prompt),
    }
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| WorkflowError::Validation {
            message: format!("could not read the reason: {}", e),
        })?;

    let entered = line.trim();
    if entered.is_empty() {
        Ok(dialog.prefilled_reason.clone().unwrap_or_default())
    } else {
        Ok(entered.to_string())
    }
}

fn parse_confirmation(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
