// note: this example assumes you've analyzed the previous one

use provide::application::Application;
use provide::runner::{ApplicationRunner, ApplicationRunnerPtr};
use provide_di::instance_provider::{ErrorPtr, InstancePtr};
use provide_di::module::Module;
use provide_di::provider::Provider;

struct PrintRunner {
    text: &'static str,
    priority: i8,
}

impl ApplicationRunner for PrintRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        print!("{}", self.text);
        Ok(())
    }

    // for ordered execution of application runners, priorities can be used
    fn priority(&self) -> i8 {
        self.priority
    }
}

fn main() {
    let runners = [
        ("exclamation", "!\n", 1),
        ("world", "world", 2),
        ("hello", "Hello ", 3),
    ];

    let module = runners
        .into_iter()
        .fold(Module::builder("PrintModule"), |builder, (name, text, priority)| {
            // each runner is registered under its own name
            builder.provider(
                Provider::<ApplicationRunnerPtr>::new(format!("provide_{name}"))
                    .named(name)
                    .instance(move |_| {
                        Ok(InstancePtr::new(PrintRunner { text, priority })
                            as InstancePtr<ApplicationRunnerPtr>)
                    }),
            )
        })
        .build()
        .expect("error building PrintModule");

    // runners are given in arbitrary order, but prints "Hello world!"
    Application::new([module])
        .with_runner("exclamation")
        .with_runner("world")
        .with_runner("hello")
        .run()
        .expect("error running application");
}
