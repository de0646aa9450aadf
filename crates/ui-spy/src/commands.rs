use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
pub use clap_complete::Shell;
use ui_spy_agent::AgentConfig;
use ui_spy_agent::DEFAULT_TREE_DEPTH;
use ui_spy_core::model::ActionKind;
use ui_spy_ipc::SessionConfig;

const LONG_ABOUT: &str = r#"ui-spy inspects and drives a running UI from the outside.

The target application hosts a small spy agent. The agent cannot accept
connections, so it dials this controller instead: every command below opens
a loopback listener, waits for the agent to connect, makes one call and
prints the result as JSON.

WORKFLOW:
    1. Start the target app (or 'ui-spy demo-agent' in another terminal)
    2. Read the control tree with 'ui-spy tree'
    3. Drive controls by AutomationId or Name with 'ui-spy action'
    4. Save snapshots to compare screens across phases

EXAMPLES:
    ui-spy tree --depth 10
    ui-spy action type Username alice
    ui-spy action click Submit
    ui-spy nav
    ui-spy snapshot save Login_Empty baseline
    ui-spy flow login-flow.json"#;

#[derive(Parser)]
#[command(name = "ui-spy")]
#[command(author, version)]
#[command(about = "Inspect and drive a running UI through its spy agent")]
#[command(long_about = LONG_ABOUT)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Loopback port the agent dials
    #[arg(short, long, global = true, env = "UI_SPY_PORT")]
    pub port: Option<u16>,

    /// How long to wait for the agent to connect, in milliseconds
    #[arg(long, global = true, env = "SPY_CONNECT_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
}

impl Cli {
    /// Environment settings with the command-line overrides applied.
    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::from_env();
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_connect_timeout(Duration::from_millis(ms));
        }
        config
    }

    pub fn agent_config(&self) -> AgentConfig {
        let config = AgentConfig::from_env();
        match self.port {
            Some(port) => config.with_port(port),
            None => config,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the abstract control tree of the running app
    #[command(long_about = r#"Print the abstract control tree of the running app.

Each control has an id, a kind, an optional label and native type, its
state (value, enabled, visible, interactive, checked, ...) and visual
properties (bounds, font, colors). Layout-only containers with no name are
pruned."#)]
    Tree {
        /// Maximum depth to walk
        #[arg(short, long, default_value_t = DEFAULT_TREE_DEPTH)]
        depth: usize,
    },

    /// Save, list and read screen snapshots
    #[command(subcommand)]
    Snapshot(SnapshotCommand),

    /// Perform an action on a control
    #[command(long_about = r#"Perform an action on a control.

Controls are found by AutomationId first, then by Name. Lookup and
capability failures are reported in the result, not as a command error.

EXAMPLES:
    ui-spy action click Submit
    ui-spy action type Username alice
    ui-spy action toggle RememberMe
    ui-spy action select Region Europe
    ui-spy action select Region 2
    ui-spy action clear Password"#)]
    Action {
        /// Action to perform
        #[arg(value_enum)]
        action: ActionVerb,

        /// Control AutomationId or Name
        id: String,

        /// Text for type, item text or index for select
        value: Option<String>,
    },

    /// Print the current page, back stack depth and navigation routes
    Nav,

    /// Run a long-lived controller speaking JSON-RPC over stdin/stdout
    #[command(long_about = r#"Run a long-lived controller speaking JSON-RPC over stdin/stdout.

One request per line on stdin, one response per line on stdout. Methods are
the tool names with named arguments:

    GetVisualTree { depth? }      SaveSnapshot { name, phase }
    ListSnapshots                 GetSnapshot { fileName }
    DoAction { action, id, value? }
    GetNavigation                 RunFlow { flow | file }
    Disconnect

The agent pairing is kept between requests until Disconnect or EOF."#)]
    Serve,

    /// Host a sample login screen and dial the controller until interrupted
    DemoAgent,

    /// Run a scripted flow from a JSON file
    Flow {
        /// Path to the flow definition
        file: PathBuf,
    },

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Capture the current screen under `{phase}_{name}.json`
    Save {
        /// Snapshot name, e.g. Login_Empty
        name: String,

        /// Phase, e.g. baseline or migrated
        phase: String,
    },

    /// List saved snapshot file names
    List,

    /// Read a saved snapshot
    Get {
        /// File name, extension optional
        file: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionVerb {
    Click,
    Type,
    Toggle,
    Select,
    Clear,
}

impl From<ActionVerb> for ActionKind {
    fn from(verb: ActionVerb) -> Self {
        match verb {
            ActionVerb::Click => ActionKind::Click,
            ActionVerb::Type => ActionKind::Type,
            ActionVerb::Toggle => ActionKind::Toggle,
            ActionVerb::Select => ActionKind::Select,
            ActionVerb::Clear => ActionKind::Clear,
        }
    }
}
