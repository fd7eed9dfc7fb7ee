use provide::application::Application;
use provide::runner::{ApplicationRunner, ApplicationRunnerPtr};
use provide_di::instance_provider::{ErrorPtr, InstancePtr};
use provide_di::module::Module;
use provide_di::provider::{Provider, Redirect};
use provide_di::Injectable;

#[derive(Injectable)]
struct Greeting;

impl Greeting {
    fn text(&self) -> &str {
        "Hello world!"
    }
}

// runners contain the actual application logic and can depend on anything the injector provides
#[derive(Injectable)]
struct HelloRunner {
    greeting: InstancePtr<Greeting>,
}

impl ApplicationRunner for HelloRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        println!("{}", self.greeting.text());
        Ok(())
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // the application runs the unnamed runner by default
    let module = Module::builder("HelloModule")
        .provider(
            Provider::<ApplicationRunnerPtr>::new("provide_runner").redirect(|_| {
                Ok(Redirect::to::<HelloRunner>(|runner| {
                    runner as InstancePtr<ApplicationRunnerPtr>
                }))
            }),
        )
        .build()
        .expect("error building HelloModule");

    // prints "Hello world!"
    Application::new([module])
        .run()
        .expect("error running application");
}
