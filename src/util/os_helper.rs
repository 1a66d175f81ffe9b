/// Author recorded on content created from the command line: the OS user's
/// real name, or the login name when no real name is set.
pub fn current_author() -> String {
    let name = whoami::realname();
    if name.trim().is_empty() {
        return whoami::username();
    }
    name.trim().to_string()
}
