use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;

lazy_static! {
    static ref READ_CURSORS: Mutex<HashMap<&'static str, usize>> = Mutex::new(HashMap::new());
}

pub fn reset_cursor(name: &'static str) {
    let mut cursors = READ_CURSORS.lock().unwrap();
    cursors.insert(name, 0);
}

pub fn advance_cursor(name: &str) -> usize {
    let mut cursors = READ_CURSORS.lock().unwrap();
    let index = cursors.get_mut(name).unwrap();
    *index += 1;
    *index - 1
}
