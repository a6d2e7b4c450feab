//! create-amp entry point and orchestration.
//! Resolves the configuration, fetches the template corpus, materializes the
//! project and runs the optional post-generation steps.

use std::time::Duration;

use create_amp::{
    cli::{get_args, Args},
    config::ProjectType,
    constants::{COMPOSE_FILE, DEFAULT_TEMPLATES_REPO},
    context::TemplateData,
    environment::Environment,
    error::{default_error_handler, Result},
    hooks::{run_post_generation, Git2Vcs, SystemRunner},
    interrupt::Interrupt,
    loader::load_corpus,
    logger::init_logger,
    processor::Processor,
    prompt::{DefaultPrompter, DialoguerPrompter, Prompter},
    readme::{dev_port, MiniJinjaRenderer},
    resolver::Resolver,
};

fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> Result<()> {
    let env = Environment::capture()?;
    let interrupt = Interrupt::install()?;

    let prompter: Box<dyn Prompter> =
        if args.yes { Box::new(DefaultPrompter) } else { Box::new(DialoguerPrompter::new()) };
    let config = Resolver::new(&*prompter, &env).resolve(args.to_partial())?;

    let source = args
        .templates
        .clone()
        .or_else(|| env.templates.clone())
        .unwrap_or_else(|| DEFAULT_TEMPLATES_REPO.to_string());
    let corpus = load_corpus(&source, &args.templates_ref, Duration::from_secs(args.timeout))?;

    interrupt.start_generation();
    println!("Creating {} in {}", config.name, config.path.display());

    let renderer = MiniJinjaRenderer::new();
    let processor = Processor::new(&config, &env, corpus.root(), &renderer)
        .with_interrupt(interrupt.flag());
    let summary = processor.materialize()?;
    log::info!(
        "Wrote {} files from {} templates ({} fragments merged)",
        summary.files,
        summary.layers.len(),
        summary.fragments
    );

    let package_manager = processor.data().package_manager;
    let outcome = run_post_generation(&config, package_manager, &Git2Vcs, &SystemRunner);

    print_summary(processor.data(), outcome.dependencies_installed);
    Ok(())
}

fn print_summary(data: &TemplateData, installed: bool) {
    let config = &data.config;
    let pm = data.package_manager;
    let (program, install_args) = pm.install_command();

    println!();
    println!("Success! Created {} at {}", config.name, config.path.display());
    println!();
    println!("Next steps:");
    println!("  cd {}", config.path.display());
    if !installed {
        let install =
            std::iter::once(program).chain(install_args.iter().copied()).collect::<Vec<_>>();
        println!("  {}", install.join(" "));
    }
    if config.path.join(COMPOSE_FILE).is_file() {
        println!("  docker-compose up -d");
    }
    println!("  {pm} run dev");
    println!();
    let what = match config.project_type {
        ProjectType::Frontend => "app",
        ProjectType::Backend => "server",
    };
    println!("Your {what} will be available at http://localhost:{}", dev_port(data));
}
