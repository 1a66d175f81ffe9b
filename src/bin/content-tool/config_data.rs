use std::fs;
use std::io;
use std::path::Path;

const CONFIG_SAMPLE: &str = r#"# For the file locations, If you want it to be relative to the executable directory
# use ${exe_dir}/location
[server]
address = "0.0.0.0"
port = 8001

# Page size of the public content listing
[defaults]
page_size = 10

# Without data_file everything is kept in memory and lost on restart
[store]
data_file = "${exe_dir}/data/content.json"

[source]
site = "{{SITE}}"
per_page = 100
max_pages = 1
excerpt_length = 300
timeout_secs = 30

# Explicit endpoint variants, tried in order. When none are listed the
# standard WordPress ones are derived from the site.
# shape is one of "array", "keyed", "envelope"
# [[source.posts_endpoints]]
# url = "{{SITE}}/wp-json/wp/v2/posts?per_page=100&status=publish"
# shape = "array"

# Used when the category directory cannot be fetched
[[source.fallback_categories]]
id = 1
name = "Uncategorized"

[log]
level = "Info"
log_to_console = true
"#;

pub(crate) fn sample_cfg(site: &str) -> String {
    CONFIG_SAMPLE.replace("{{SITE}}", site.trim_end_matches('/'))
}

pub(crate) fn write_sample_cfg(file_path: &Path, site: &str) -> io::Result<()> {
    if file_path.exists() {
        return Err(io::Error::new(io::ErrorKind::AlreadyExists,
            format!("{} already exists", file_path.display())));
    }
    fs::write(file_path, sample_cfg(site))
}
