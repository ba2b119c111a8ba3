use recipe_crawler::{
    Crawler, CrawlerConfig, CrawlerError, ExtractorConfig, HttpClient, ParallelCrawler,
    RecipeExtractor, SiteConfig,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn recipe_page(title: &str, servings_heading: &str) -> String {
    format!(
        r#"
        <html>
        <body>
            <ul class="breadcrumb"><li>Inicio</li><li>Recetas</li><li>Arroces</li></ul>
            <h1 class="m-titulo">{title}</h1>
            <p><span>Tiempo total:</span> 30 min</p>
            <div class="print_video"><img src="/archivos/foto.jpg"></div>
            {servings_heading}
            <ul class="ingredientes"><li>300 g de arroz</li><li>1 l de caldo</li></ul>
            <div class="cuerpo">
                <h2>Elaboración</h2>
                <p>Sofríe la verdura.</p>
                <p>Añade el arroz y el caldo.</p>
                <h2>Otras recetas</h2>
            </div>
        </body>
        </html>
        "#
    )
}

fn sitemap(locs: &[String]) -> String {
    let urls: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        urls
    )
}

fn site_for(server: &MockServer) -> SiteConfig {
    SiteConfig {
        base_url: server.uri(),
        sitemap_url: format!("{}/sitemap.xml", server.uri()),
        recipe_prefix: format!("{}/cocina/recetas/", server.uri()),
    }
}

fn parallel_crawler(base: &str, concurrency: usize) -> ParallelCrawler {
    let client = HttpClient::new(Arc::new(CrawlerConfig::default())).unwrap();
    let extractor = RecipeExtractor::new(ExtractorConfig::default(), Url::parse(base).unwrap()).unwrap();
    ParallelCrawler::new(client, Arc::new(extractor), concurrency)
}

#[tokio::test]
async fn test_end_to_end_filters_sitemap() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    let locs = vec![
        format!("{}/cocina/recetas/A", base),
        format!("{}/cocina/otros/B", base),
        format!("{}/cocina/recetas/C", base),
    ];

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sitemap(&locs).into_bytes(), "application/xml"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/cocina/recetas/[AC]$"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            recipe_page("Paella valenciana", r#"<h2 id="ingredientes-para-4">Ingredientes para 4 personas</h2>"#)
                .into_bytes(),
            "text/html; charset=utf-8",
        ))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cocina/otros/B"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::with_config(
        CrawlerConfig::default(),
        site_for(&mock_server),
        ExtractorConfig::default(),
    )
    .unwrap();

    let urls = crawler.recipe_urls().await.unwrap();
    assert_eq!(
        urls.iter().map(|u| u.as_str().to_string()).collect::<Vec<_>>(),
        vec![locs[0].clone(), locs[2].clone()]
    );

    let report = crawler.run().await.unwrap();
    assert_eq!(report.recipes.len(), 2);
    assert!(report.failures.is_empty());

    let sources: HashSet<&str> = report.recipes.iter().map(|r| r.source.as_str()).collect();
    assert!(sources.contains(locs[0].as_str()));
    assert!(sources.contains(locs[2].as_str()));

    let recipe = &report.recipes[0];
    assert_eq!(recipe.title, "Paella valenciana");
    assert_eq!(recipe.category, "Arroces");
    assert_eq!(recipe.prep_time, "30 min");
    assert_eq!(recipe.servings, Some(4));
    assert_eq!(recipe.img, format!("{}/archivos/foto.jpg", base));
    assert_eq!(recipe.ingredients, vec!["300 g de arroz", "1 l de caldo"]);
    assert_eq!(recipe.instructions.len(), 2);
}

#[tokio::test]
async fn test_pool_survives_failing_pages() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path_regex(r"^/cocina/recetas/ok-\d+$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(recipe_page("Arroz negro", "").into_bytes(), "text/html")
                .set_delay(Duration::from_millis(10)),
        )
        .expect(90)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/cocina/recetas/broken-\d+$"))
        .respond_with(ResponseTemplate::new(500))
        .expect(10)
        .mount(&mock_server)
        .await;

    let urls: Vec<Url> = (0..100)
        .map(|i| {
            let slug = if i % 10 == 3 {
                format!("broken-{}", i)
            } else {
                format!("ok-{}", i)
            };
            Url::parse(&format!("{}/cocina/recetas/{}", base, slug)).unwrap()
        })
        .collect();

    let crawler = parallel_crawler(&base, 10);
    let report = crawler.crawl_urls(urls).await;

    assert_eq!(report.recipes.len(), 90);
    assert_eq!(report.failures.len(), 10);

    let unique: HashSet<&str> = report.recipes.iter().map(|r| r.source.as_str()).collect();
    assert_eq!(unique.len(), 90, "no record should appear twice");
    assert!(report.recipes.iter().all(|r| r.source.contains("/ok-")));
    assert!(report.recipes.iter().all(|r| r.servings.is_none()));

    for (url, error) in &report.failures {
        assert!(url.path().contains("broken-"));
        assert!(matches!(error, CrawlerError::Http(_)));
    }

    let stats = report.stats();
    assert_eq!(stats.attempted, 100);
    assert_eq!(stats.extracted, 90);
    assert_eq!(stats.failed, 10);
}

#[tokio::test]
async fn test_empty_page_is_skipped_not_fatal() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/cocina/recetas/vacia"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(Vec::new(), "text/html"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cocina/recetas/llena"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            recipe_page("Risotto de setas", "").into_bytes(),
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    let urls = vec![
        Url::parse(&format!("{}/cocina/recetas/vacia", base)).unwrap(),
        Url::parse(&format!("{}/cocina/recetas/llena", base)).unwrap(),
    ];

    let report = parallel_crawler(&base, 2).crawl_urls(urls).await;

    assert_eq!(report.recipes.len(), 1);
    assert_eq!(report.recipes[0].title, "Risotto de setas");
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].1, CrawlerError::EmptyDocument(_)));
}

#[tokio::test]
async fn test_unreachable_sitemap_aborts_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/cocina/recetas/.*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::with_config(
        CrawlerConfig::default(),
        site_for(&mock_server),
        ExtractorConfig::default(),
    )
    .unwrap();

    let err = crawler.run().await.unwrap_err();
    assert!(matches!(err, CrawlerError::Http(_)));
}

#[tokio::test]
async fn test_malformed_sitemap_aborts_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<urlset><url><loc>https://www.hogarmania.com/cocina/recetas/a</url></urlset>",
        ))
        .mount(&mock_server)
        .await;

    let crawler = Crawler::with_config(
        CrawlerConfig::default(),
        site_for(&mock_server),
        ExtractorConfig::default(),
    )
    .unwrap();

    let err = crawler.run().await.unwrap_err();
    assert!(matches!(err, CrawlerError::Xml(_) | CrawlerError::Sitemap(_)));
}

#[tokio::test]
async fn test_servings_from_heading() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/cocina/recetas/con-raciones"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            recipe_page(
                "Fabada asturiana",
                r#"<h2 id="ingredientes-para-6-personas">Ingredientes para 6 personas</h2>"#,
            )
            .into_bytes(),
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/cocina/recetas/con-raciones", base)).unwrap();
    let recipe = parallel_crawler(&base, 1).crawl_single(url).await.unwrap();

    assert_eq!(recipe.title, "Fabada asturiana");
    assert_eq!(recipe.servings, Some(6));
}
