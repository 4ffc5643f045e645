use uuid::Uuid;

const ID_LEN: usize = 7;

/// Short opaque task id: the first hex digits of a random v4 UUID.
pub fn new_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

/// Like [`new_id`], but never returns an id for which `taken` is true.
pub fn new_unique_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = new_id();
        if !taken(&id) {
            return id;
        }
        log::debug!("regenerating colliding id {id}");
    }
}
