// note: this example assumes you've analyzed the previous one

use provide::application::Application;
use provide::config::ApplicationConfig;
use provide::runner::{ApplicationRunner, ApplicationRunnerPtr};
use provide_di::instance_provider::{ErrorPtr, InstancePtr};
use provide_di::module::Module;
use provide_di::provider::{Provider, Redirect};
use provide_di::Injectable;

// the application config is registered in the injector, so it can be injected like any other
// dependency
#[derive(Injectable)]
struct ConfigPrinterRunner {
    config: InstancePtr<ApplicationConfig>,
}

impl ApplicationRunner for ConfigPrinterRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        println!("Using built-in logger: {}", self.config.install_tracing_logger);
        Ok(())
    }
}

fn main() {
    let module = Module::builder("ConfigModule")
        .provider(
            Provider::<ApplicationRunnerPtr>::new("provide_runner").redirect(|_| {
                Ok(Redirect::to::<ConfigPrinterRunner>(|runner| {
                    runner as InstancePtr<ApplicationRunnerPtr>
                }))
            }),
        )
        .build()
        .expect("error building ConfigModule");

    // by default, the config is read from environment variables and the config file (see module
    // documentation); start with a default config and override what's needed instead
    let mut config = ApplicationConfig::default();
    config.install_tracing_logger = false;

    // prints "Using built-in logger: false"
    Application::new([module])
        .with_config(config)
        .run()
        .expect("error running application");
}
