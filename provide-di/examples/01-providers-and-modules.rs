// note: this example assumes you've analyzed the previous one

use provide_di::injector::{Injector, InjectorRef};
use provide_di::instance_provider::{InstancePtr, TypedInstanceProvider};
use provide_di::module::Module;
use provide_di::provider::Provider;
use provide_di::Injectable;

struct Settings {
    greeting: String,
    audience: String,
}

#[derive(Injectable)]
struct Greeter {
    settings: InstancePtr<Settings>,
    // named dependencies are distinct from unnamed ones of the same type
    #[inject(name = "name")]
    name: InstancePtr<String>,
    // the injector itself is available under a reserved name
    #[inject(injector)]
    injector: InstancePtr<InjectorRef>,
    // fields can also be initialized without injection
    #[inject(default = "default_punctuation")]
    punctuation: char,
}

fn default_punctuation() -> char {
    '!'
}

impl Greeter {
    fn greet(&self) {
        println!("{} {}{}", self.settings.greeting, self.name, self.punctuation);
    }
}

fn main() {
    // types which cannot construct themselves need explicit providers, grouped in modules
    let settings = Module::builder("SettingsModule")
        .provider(Provider::<Settings>::new("provide_settings").instance(|_| {
            Ok(InstancePtr::new(Settings {
                greeting: "Hello".to_string(),
                audience: "world".to_string(),
            }))
        }))
        .build()
        .expect("error building SettingsModule");

    // modules can install other modules, forming a tree
    let application = Module::builder("ApplicationModule")
        .provider(
            Provider::<String>::new("provide_name")
                .named("name")
                // providers can have their own dependencies
                .parameter::<Settings>("settings")
                .instance(|arguments| {
                    let settings = arguments.next::<Settings>()?;
                    Ok(InstancePtr::new(settings.audience.to_uppercase()))
                }),
        )
        .install([settings])
        .build()
        .expect("error building ApplicationModule");

    let injector = Injector::new([application]).expect("error creating Injector");

    let greeter = injector
        .get_instance::<Greeter>()
        .expect("error creating Greeter");

    // prints "Hello WORLD!"
    greeter.greet();

    assert!(greeter.injector.is(&injector));
}
