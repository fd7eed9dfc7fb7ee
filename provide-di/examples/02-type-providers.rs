// note: this example assumes you've analyzed the previous one

use provide_di::injector::Injector;
use provide_di::instance_provider::{InstancePtr, TypedInstanceProvider};
use provide_di::module::Module;
use provide_di::provider::{Provider, Redirect};
use provide_di::Injectable;

// traits can't be constructed, so a provider must decide which implementation to use
trait Storage: Send + Sync {
    fn describe(&self) -> String;
}

#[derive(Injectable)]
struct Clock;

#[derive(Injectable)]
struct MemoryStorage {
    _clock: InstancePtr<Clock>,
}

impl Storage for MemoryStorage {
    fn describe(&self) -> String {
        "memory storage".to_string()
    }
}

#[derive(Injectable)]
struct FileStorage {
    _clock: InstancePtr<Clock>,
}

impl Storage for FileStorage {
    fn describe(&self) -> String {
        "file storage".to_string()
    }
}

fn main() {
    for in_memory in [true, false] {
        // a type provider returns a redirect to an injectable type, which is then constructed by
        // the injector with its own dependencies
        let module = Module::builder("StorageModule")
            .provider(Provider::<dyn Storage>::new("provide_storage").redirect(move |_| {
                Ok(if in_memory {
                    Redirect::to::<MemoryStorage>(|storage| storage as InstancePtr<dyn Storage>)
                } else {
                    Redirect::to::<FileStorage>(|storage| storage as InstancePtr<dyn Storage>)
                })
            }))
            .build()
            .expect("error building StorageModule");

        let injector = Injector::new([module]).expect("error creating Injector");

        let storage = injector
            .get_instance::<dyn Storage>()
            .expect("error creating Storage");

        // prints "Using memory storage" and then "Using file storage"
        println!("Using {}", storage.describe());
    }
}
