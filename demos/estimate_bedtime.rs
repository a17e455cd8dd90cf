//! Print the bedtime alert for the form's default values

use betterrest::{SharedModel, SleepForm};

static MODEL: SharedModel = SharedModel::embedded();

fn main() {
    let mut form = SleepForm::default();
    form.increment_sleep();

    println!("Sleep: {}, coffee: {}", form.sleep_label(), form.coffee_label());
    println!("{}", form.calculate(&MODEL));
}
