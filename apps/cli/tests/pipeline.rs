//! Full sync against a fixture portal served on localhost.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::net::SocketAddr;

use axum::extract::{Form, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use bankfetch_cli::{build_state, run, Config};
use bankfetch_core::store::{selector, DocumentStore};
use serde_json::json;
use tempfile::{tempdir, TempDir};
use zip::write::SimpleFileOptions;

const LOGIN: &str = "98765432100";
const SECRET: &str = "123456";

const LANDING: &str = r#"<html><head>
<script>var tracking = true;</script>
<script>var chemin = "/stb/entreeBam?act=login";</script>
</head><body>Bienvenue</body></html>"#;

const ACCOUNTS: &str = r#"<html><body>
<input type="hidden" name="sessionSAG" value="SAG42">
<table class="ca-table"><tbody>
  <tr>
    <td onmouseover="infobulle('LIVRET A')">LIVRET...</td>
    <td>11111111111</td>
    <td>1 520,30</td>
    <td>EUR</td>
    <td><a href="javascript:telecharge('entreeBam?act=export&amp;num=111')"><img src="dl.gif"></a></td>
  </tr>
  <tr>
    <td>COMPTE CHEQUE</td>
    <td>22222222222</td>
    <td>-42,50</td>
    <td>EUR</td>
    <td><a href="javascript:telecharge('entreeBam?act=export&amp;num=222')"><img src="dl.gif"></a></td>
  </tr>
</tbody></table>
</body></html>"#;

const REFUSED: &str = r#"<html><body><p class="erreur">Identifiant ou code incorrect</p></body></html>"#;

const STATEMENT_INDEX: &str = r##"<html><body>
<div id="entete1">RELEVES DE COMPTES</div>
<div id="panneau1">
  <table class="ca-table"><tbody>
    <tr><td><a href="#">+</a> <a href="#">LIVRET A</a></td>
        <td><a class="fleche-ouvrir" href="entreeBam?act=releves&amp;idx=0">ouvrir</a></td></tr>
  </tbody></table>
  <table class="ca-table"><tbody>
    <tr><td><a href="#">+</a> <a href="#">COMPTE CHEQUE</a></td>
        <td><a class="fleche-ouvrir" href="entreeBam?act=releves&amp;idx=1">ouvrir</a></td></tr>
  </tbody></table>
</div>
</body></html>"##;

const STATEMENT_DETAIL: &str = r#"<html><body>
<div id="panneau1">
  <table><tbody>
    <tr title="Relevé"><td>25/03/2024</td><td>Relevé</td><td>PDF</td>
        <td><a href="javascript:void(0);ouvrePDF('entreeBam?act=pdf&amp;doc=L1')">voir</a></td></tr>
    <tr title="Relevé"><td>25/04/2024</td><td>Relevé</td><td>PDF</td>
        <td><a href="javascript:void(0);ouvrePDF('entreeBam?act=pdf&amp;doc=L2')">voir</a></td></tr>
  </tbody></table>
  <table><tbody>
    <tr title="Relevé"><td>02/04/2024</td><td>Relevé</td><td>PDF</td>
        <td><a href="javascript:void(0);ouvrePDF('entreeBam?act=pdf&amp;doc=C1')">voir</a></td></tr>
  </tbody></table>
</div>
</body></html>"#;

/// Posted code of a keypad digit.
fn key_code(digit: u32) -> String {
    format!("{:02}", (digit * 7 + 3) % 10 + 10 * digit)
}

fn keypad_page() -> String {
    // Shuffled display order, like the real keypad.
    let cells: String = [7, 2, 9, 0, 4, 1, 8, 3, 6, 5]
        .iter()
        .map(|d| format!(r##"<td onclick="clavier.touche('{}');"><a href="#">{}</a></td>"##, key_code(*d), d))
        .collect();
    format!(
        r##"<html><body><form>
           <input type="hidden" name="idUnique" value="U-77">
           <input type="hidden" name="caisse" value="882">
           </form>
           <table id="pave-saisie-code"><tbody><tr>{}<td><a href="#"> </a></td></tr></tbody></table>
           </body></html>"##,
        cells
    )
}

enum Cell<'a> {
    Text(&'a str),
    Empty,
}

/// Minimal single-sheet xlsx with inline strings.
fn workbook(rows: &[Vec<Cell<'_>>]) -> Vec<u8> {
    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        sheet.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            if let Cell::Text(text) = cell {
                sheet.push_str(&format!(
                    r#"<c r="{}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    (b'A' + c as u8) as char,
                    r + 1,
                    text.replace('&', "&amp;").replace('<', "&lt;")
                ));
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let files = [
        ("[Content_Types].xml", r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string()),
        ("_rels/.rels", r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string()),
        ("xl/workbook.xml", r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Operations" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string()),
        ("xl/_rels/workbook.xml.rels", r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string()),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn export(lines: Vec<[Cell<'static>; 4]>) -> Vec<u8> {
    let mut rows: Vec<Vec<Cell<'static>>> = vec![vec![Cell::Text("Crédit Agricole")]];
    while rows.len() < 8 {
        rows.push(vec![]);
    }
    rows.push(vec![
        Cell::Text("Date"),
        Cell::Text("Libellé"),
        Cell::Text("Débit Euros"),
        Cell::Text("Crédit Euros"),
    ]);
    rows.extend(lines.into_iter().map(Vec::from));
    workbook(&rows)
}

fn has_session_cookie(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("JSESSIONID=fixture"))
}

async fn landing() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, "JSESSIONID=fixture; Path=/")],
        Html(LANDING),
    )
}

async fn login(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    if !has_session_cookie(&headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match form.get("typeAuthentification").map(String::as_str) {
        Some("CLIC_ALLER") => Html(keypad_page()).into_response(),
        Some("CLIC_RETOUR") => {
            let expected: Vec<String> = SECRET
                .chars()
                .filter_map(|c| c.to_digit(10))
                .map(key_code)
                .collect();
            let accepted = form.get("CCCRYC") == Some(&expected.join(","))
                && form.get("CCPTE").map(String::as_str) == Some(LOGIN)
                && form.get("idUnique").map(String::as_str) == Some("U-77")
                && form.get("caisse").map(String::as_str) == Some("882");
            if accepted {
                Html(ACCOUNTS).into_response()
            } else {
                Html(REFUSED).into_response()
            }
        }
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn navigate(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Response {
    if !has_session_cookie(&headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let param = |name: &str| query.get(name).map(String::as_str).unwrap_or_default();
    match param("act") {
        "export" => {
            let bytes = match param("num") {
                "111" => export(vec![[
                    Cell::Text("01-jan"),
                    Cell::Text("VIR EPARGNE"),
                    Cell::Empty,
                    Cell::Text("100,00"),
                ]]),
                _ => export(vec![
                    [
                        Cell::Text("02-jan"),
                        Cell::Text("CB CAFE\u{1b} :CARTE 99"),
                        Cell::Text("3,50"),
                        Cell::Empty,
                    ],
                    [Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty],
                    [
                        Cell::Text("03-janv"),
                        Cell::Text("FRAIS TENUE"),
                        Cell::Empty,
                        Cell::Empty,
                    ],
                    [
                        Cell::Text("04-jan"),
                        Cell::Text("VIR SALAIRE"),
                        Cell::Empty,
                        Cell::Text("2 100,00"),
                    ],
                ]),
            };
            (
                [(
                    header::CONTENT_TYPE,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                )],
                bytes,
            )
                .into_response()
        }
        "Edocsynth" if param("sessionSAG") == "SAG42" => Html(STATEMENT_INDEX).into_response(),
        "releves" => Html(STATEMENT_DETAIL).into_response(),
        "pdf" => (
            [(header::CONTENT_TYPE, "application/pdf")],
            format!("%PDF-1.4 {}", param("doc")),
        )
            .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn start_portal() -> SocketAddr {
    let app = Router::new()
        .route("/particuliers.html", get(landing))
        .route("/stb/entreeBam", get(navigate).post(login));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config(tmp: &TempDir, addr: SocketAddr, secret: &str) -> Config {
    let regions = tmp.path().join("regions.json");
    std::fs::write(
        &regions,
        json!({ "fixture": format!("http://{}/", addr) }).to_string(),
    )
    .unwrap();

    let env: HashMap<&str, String> = HashMap::from([
        ("BF_BANK_ID", "fixture".to_string()),
        ("BF_LOGIN", LOGIN.to_string()),
        ("BF_PASSWORD", secret.to_string()),
        ("BF_DB_PATH", tmp.path().join("db/bankfetch.db").to_string_lossy().to_string()),
        ("BF_FILES_DIR", tmp.path().join("statements").to_string_lossy().to_string()),
        ("BF_REGIONS_FILE", regions.to_string_lossy().to_string()),
        ("BF_DOWNLOAD_TIMEOUT_SECS", "60".to_string()),
        ("BF_HTTP_TIMEOUT_SECS", "5".to_string()),
    ]);
    Config::from_lookup(|key| env.get(key).cloned()).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn full_sync_against_fixture_portal() {
    let addr = start_portal().await;
    let tmp = tempdir().unwrap();
    let config = config(&tmp, addr, SECRET);
    let state = build_state(&config).await.unwrap();

    let summary = run(&state, &config).await.unwrap();
    assert_eq!(summary.accounts_upserted, 2);
    assert_eq!(summary.transactions_persisted, 4);
    assert_eq!(summary.balance_histories_upserted, 2);
    assert_eq!(summary.documents_saved, 3);
    assert_eq!(summary.documents_skipped, 0);
    assert_eq!(summary.data_quality_issues, 1);
    assert!(summary.truncated_accounts.is_empty());
    assert!(summary.failed_documents.is_empty());

    let livret = state
        .store
        .indexed_query(
            "bank.accounts",
            &["number"],
            &selector([("number", json!("11111111111"))]),
            1,
        )
        .await
        .unwrap();
    assert_eq!(livret.len(), 1);
    assert_eq!(livret[0]["label"], "LIVRET A");
    assert_eq!(livret[0]["type"], "bank");
    assert_eq!(livret[0]["balance"], json!(1520.3));
    assert_eq!(livret[0]["linkOperations"], "entreeBam?act=export&num=111");

    let statements = tmp.path().join("statements");
    for (file, doc) in [
        ("releve_20240325_LIVRET_A.pdf", "L1"),
        ("releve_20240425_LIVRET_A.pdf", "L2"),
        ("releve_20240402_COMPTE_CHEQUE.pdf", "C1"),
    ] {
        let content = std::fs::read_to_string(statements.join(file)).unwrap();
        assert_eq!(content, format!("%PDF-1.4 {}", doc));
    }

    // A second run refreshes accounts and balances, appends operations again
    // and finds every statement already saved.
    let summary = run(&state, &config).await.unwrap();
    assert_eq!(summary.documents_saved, 0);
    assert_eq!(summary.documents_skipped, 3);
    assert_eq!(state.store.count("bank.accounts").unwrap(), 2);
    assert_eq!(state.store.count("bank.balancehistories").unwrap(), 2);
    assert_eq!(state.store.count("bank.operations").unwrap(), 8);
}

#[tokio::test(flavor = "multi_thread")]
async fn refused_credentials_report_login_failure() {
    let addr = start_portal().await;
    let tmp = tempdir().unwrap();
    let config = config(&tmp, addr, "654321");
    let state = build_state(&config).await.unwrap();

    let err = run(&state, &config).await.unwrap_err();
    assert_eq!(err.boundary_code(), "LOGIN_FAILED");
    assert_eq!(state.store.count("bank.accounts").unwrap(), 0);
}
