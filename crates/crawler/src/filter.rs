use url::Url;

/// Keep the URLs whose string form starts with `prefix`, in their original
/// order.
pub fn filter_recipe_urls(urls: Vec<Url>, prefix: &str) -> Vec<Url> {
    urls.into_iter()
        .filter(|url| url.as_str().starts_with(prefix))
        .collect()
}
