//! A sample app for trying the controller without a real target: a login
//! screen inside a navigation shell, served by the reverse connector until
//! SIGINT or SIGTERM.

use std::rc::Rc;
use std::rc::Weak;
use std::sync::Arc;

use tracing::info;
use tracing::warn;
use ui_spy_agent::AgentConfig;
use ui_spy_agent::AutomationService;
use ui_spy_agent::ConnectorHandle;
use ui_spy_agent::ReverseConnector;
use ui_spy_core::element::Command;
use ui_spy_core::element::CommandBinding;
use ui_spy_core::element::Element;
use ui_spy_core::element::ElementRef;
use ui_spy_core::element::ItemList;
use ui_spy_core::element::MenuItem;
use ui_spy_core::element::NativeClass;
use ui_spy_core::element::TextInput;
use ui_spy_core::element::Widget;
use ui_spy_core::spawn_ui_thread;
use ui_spy_core::Window;

use crate::error::CliError;

/// Runs until a shutdown signal arrives.
pub fn run_demo_agent(config: AgentConfig) -> Result<(), CliError> {
    let (ui, ui_thread) = spawn_ui_thread(login_screen).map_err(CliError::UiThread)?;
    let service = Arc::new(AutomationService::from_config(ui, &config));
    let port = config.port;
    let snapshot_dir = config.snapshot_dir.clone();

    let connector = ReverseConnector::new(config, service);
    install_shutdown_handler(connector.handle())?;
    info!(
        port,
        snapshots = %snapshot_dir.display(),
        "Demo agent running, press Ctrl-C to stop"
    );

    connector.run();

    // The connector owns the last service handle; dropping it lets the UI thread exit.
    drop(connector);
    if ui_thread.join().is_err() {
        warn!("UI thread panicked");
    }
    Ok(())
}

#[cfg(unix)]
fn install_shutdown_handler(handle: ConnectorHandle) -> Result<(), CliError> {
    use signal_hook::consts::SIGINT;
    use signal_hook::consts::SIGTERM;
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).map_err(|e| CliError::SignalSetup(e.to_string()))?;

    std::thread::Builder::new()
        .name("signal-handler".to_string())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                info!(signal = sig, "Received signal, shutting down");
                handle.shutdown();
            }
        })
        .map_err(|e| CliError::SignalSetup(format!("failed to spawn signal handler: {}", e)))?;
    Ok(())
}

#[cfg(not(unix))]
fn install_shutdown_handler(_handle: ConnectorHandle) -> Result<(), CliError> {
    Ok(())
}

/// Navigation shell around a frame showing the login page.
pub fn login_screen(window: &Window) {
    let frame = Element::builder(NativeClass::Frame)
        .name("RootFrame")
        .layout(0.0, 48.0, 800.0, 552.0)
        .widget(Widget::Frame {
            back_stack: Vec::new(),
        })
        .build();
    frame.append_child(login_page(Rc::downgrade(&frame)));

    let shell = Element::builder(NativeClass::NavigationView)
        .automation_id("MainNav")
        .layout(0.0, 0.0, 800.0, 600.0)
        .widget(Widget::Menu(vec![
            MenuItem::new(Some("login"), Some("Sign in")),
            MenuItem::new(Some("home"), Some("Home")),
            MenuItem::new(None, Some("Settings")),
        ]))
        .child(frame)
        .build();
    window.set_content(Some(shell));
}

fn login_page(frame: Weak<Element>) -> ElementRef {
    let submit = Command::new(move |_| {
        if let Some(frame) = frame.upgrade() {
            frame.navigate(home_page());
        }
    });

    Element::builder(NativeClass::Page)
        .type_name("LoginPage")
        .layout(0.0, 0.0, 800.0, 552.0)
        .child(
            Element::builder(NativeClass::StackPanel)
                .layout(200.0, 80.0, 400.0, 360.0)
                .children([
                    Element::builder(NativeClass::TextBlock)
                        .automation_id("Title")
                        .layout(0.0, 0.0, 400.0, 40.0)
                        .widget(Widget::Label("Welcome".to_string()))
                        .build(),
                    Element::builder(NativeClass::TextBox)
                        .automation_id("Username")
                        .layout(0.0, 56.0, 400.0, 32.0)
                        .widget(Widget::Text(TextInput {
                            text: String::new(),
                            placeholder: Some("User name".to_string()),
                            read_only: false,
                        }))
                        .build(),
                    Element::builder(NativeClass::PasswordBox)
                        .automation_id("Password")
                        .layout(0.0, 104.0, 400.0, 32.0)
                        .widget(Widget::Password {
                            password: String::new(),
                            placeholder: Some("Password".to_string()),
                        })
                        .build(),
                    Element::builder(NativeClass::CheckBox)
                        .automation_id("RememberMe")
                        .layout(0.0, 152.0, 400.0, 32.0)
                        .widget(Widget::Toggle {
                            content: Some("Remember me".to_string()),
                            checked: Some(false),
                        })
                        .build(),
                    Element::builder(NativeClass::ComboBox)
                        .automation_id("Region")
                        .layout(0.0, 200.0, 400.0, 32.0)
                        .widget(Widget::Items(ItemList::new(["Europe", "Americas", "Asia"])))
                        .build(),
                    Element::builder(NativeClass::Button)
                        .automation_id("Submit")
                        .layout(0.0, 256.0, 120.0, 40.0)
                        .widget(Widget::Content(Some("Sign in".to_string())))
                        .command(CommandBinding::new(submit))
                        .build(),
                    Element::builder(NativeClass::ProgressRing)
                        .automation_id("Busy")
                        .layout(136.0, 256.0, 40.0, 40.0)
                        .widget(Widget::Ring { active: false })
                        .build(),
                ])
                .build(),
        )
        .build()
}

fn home_page() -> ElementRef {
    Element::builder(NativeClass::Page)
        .type_name("HomePage")
        .layout(0.0, 0.0, 800.0, 552.0)
        .child(
            Element::builder(NativeClass::StackPanel)
                .children([
                    Element::builder(NativeClass::TextBlock)
                        .automation_id("Greeting")
                        .widget(Widget::Label("Signed in".to_string()))
                        .build(),
                    Element::builder(NativeClass::ListView)
                        .automation_id("Recent")
                        .widget(Widget::Items(ItemList::new(["Inbox", "Reports"])))
                        .build(),
                ])
                .build(),
        )
        .build()
}
