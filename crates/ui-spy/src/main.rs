use std::io;
use std::io::Write;
use std::process;

use clap::CommandFactory;
use clap::Parser;
use clap_complete::generate;

use ui_spy::commands::Cli;
use ui_spy::commands::Commands;
use ui_spy::commands::SnapshotCommand;
use ui_spy::demo::run_demo_agent;
use ui_spy::error::exit_code_for_category;
use ui_spy::flow::load_flow;
use ui_spy::flow::FlowRunner;
use ui_spy::serve::serve;
use ui_spy::tools::run_tool;
use ui_spy::CliError;
use ui_spy::Tool;
use ui_spy_common::init_tracing;
use ui_spy_core::model::ActionCommand;
use ui_spy_ipc::SpyClient;

/// A flow that ran but did not pass.
const EXIT_FLOW_FAILED: i32 = 1;

fn main() {
    let cli = Cli::parse();
    let code = {
        let _telemetry = init_tracing(default_log_level(&cli.command));
        match run(cli) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!("Suggestion: {}", e.suggestion());
                e.exit_code()
            }
        }
    };
    process::exit(code);
}

fn default_log_level(command: &Commands) -> &'static str {
    match command {
        Commands::DemoAgent => "info",
        _ => "warn",
    }
}

fn run(cli: Cli) -> Result<i32, CliError> {
    let session_config = cli.session_config();
    let agent_config = cli.agent_config();

    let tool = match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "ui-spy", &mut io::stdout());
            return Ok(0);
        }
        Commands::DemoAgent => {
            run_demo_agent(agent_config)?;
            return Ok(0);
        }
        Commands::Serve => {
            let client = SpyClient::new(session_config);
            serve(&client, io::stdin().lock(), io::stdout().lock())?;
            return Ok(0);
        }
        Commands::Flow { file } => {
            let flow = load_flow(&file)?;
            let client = SpyClient::new(session_config);
            let report = FlowRunner::new(&client).run(&flow);
            client.disconnect();

            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &report).map_err(io::Error::from)?;
            writeln!(stdout)?;
            return Ok(if report.passed { 0 } else { EXIT_FLOW_FAILED });
        }

        Commands::Tree { depth } => Tool::Tree { depth },
        Commands::Snapshot(SnapshotCommand::Save { name, phase }) => {
            Tool::SaveSnapshot { name, phase }
        }
        Commands::Snapshot(SnapshotCommand::List) => Tool::ListSnapshots,
        Commands::Snapshot(SnapshotCommand::Get { file }) => Tool::GetSnapshot { file_name: file },
        Commands::Action { action, id, value } => {
            let mut command = ActionCommand::new(action, id);
            command.value = value;
            Tool::DoAction(command)
        }
        Commands::Nav => Tool::Navigation,
    };

    let client = SpyClient::new(session_config);
    let output = run_tool(&client, &tool, client.port());
    client.disconnect();

    println!("{}", output.to_pretty());
    Ok(output.failure.map(exit_code_for_category).unwrap_or(0))
}
