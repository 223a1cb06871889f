use std::collections::BTreeMap;
use std::io::Write;
use std::{
    env,
    fs::{self, OpenOptions},
};

use anyhow::Context;
use log::info;
use serde::Serialize;
use studytrack::content::{
    ClientConfig, ContentKey, ContentKind, ContentLoader, ContentState, ContentTree,
    HttpContentClient,
};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const DEFAULT_OUTPUT_DIR: &str = "output/content";
const USAGE: &str = "Usage: cargo run --bin fetch_content <course> <subject> <exam_board> [exam-questions|revision-notes|past-papers] [output_dir]";

pub struct Config {
    pub key: ContentKey,
    pub output_dir: String,
}

fn parse_config(mut args: impl Iterator<Item = String>) -> anyhow::Result<Config> {
    let course = args.next().context("course is required")?;
    let subject = args.next().context("subject is required")?;
    let exam_board = args.next().context("exam_board is required")?;
    let kind = match args.next() {
        Some(k) => k.parse::<ContentKind>()?,
        None => ContentKind::ExamQuestions,
    };
    let output_dir = args.next().unwrap_or(DEFAULT_OUTPUT_DIR.to_string());

    Ok(Config {
        key: ContentKey::new(kind, course, subject, exam_board),
        output_dir,
    })
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let config = match parse_config(env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{USAGE}");
            return Err(e);
        }
    };

    let client = HttpContentClient::new(ClientConfig::from_env());
    info!("using content backend {}", client.config().base_url);

    let mut loader = ContentLoader::new(client, config.key.clone());
    let tree = match loader.load() {
        ContentState::Loaded(tree) => tree,
        ContentState::Empty => {
            println!("no topics published for {BOLD}{}{RESET} yet", config.key);
            return Ok(());
        }
        ContentState::Failed(e) => anyhow::bail!("failed to fetch {}: {e}", config.key),
        ContentState::Loading | ContentState::Idle => {
            anyhow::bail!("no content loaded for {}", config.key)
        }
    };

    fs::create_dir_all(&config.output_dir).context("failed to create output directory")?;
    let path = write_outline(tree, &config.key, &config.output_dir)
        .context("failed to write content outline")?;

    for topic in &tree.topics {
        println!(
            "{BOLD}{}{RESET} ({} subsections, {} questions)",
            topic.name,
            topic.subsections.len(),
            topic.total_questions
        );
    }
    println!(
        "\nwrote outline of {BOLD}{}{RESET} topics to {BOLD}{}{RESET}",
        tree.topics.len(),
        path
    );

    Ok(())
}

fn write_outline(tree: &ContentTree, key: &ContentKey, output_dir: &str) -> anyhow::Result<String> {
    let file_slug = github_slugger::Slugger::default().slug(&format!(
        "{} {} {} {}",
        key.kind.path(),
        key.course,
        key.subject,
        key.exam_board
    ));
    let path = format!("{}/{}.yaml", output_dir, file_slug);

    let mut slugger = github_slugger::Slugger::default();
    let topics: Vec<TopicOutline> = tree
        .topics
        .iter()
        .map(|topic| TopicOutline {
            id: topic.id.as_str(),
            name: &topic.name,
            total_questions: topic.total_questions,
            subsections: topic
                .subsections
                .iter()
                .map(|s| SubsectionOutline {
                    id: s.id.as_str(),
                    slug: slugger.slug(&s.name),
                    name: &s.name,
                    questions: s.questions.len(),
                    marks: s.questions.iter().map(|q| q.marks).sum(),
                    resource: s.resource.as_deref(),
                })
                .collect(),
        })
        .collect();

    let mut map = BTreeMap::<&str, OutlineFrontmatter>::new();
    map.insert("kind", OutlineFrontmatter::Text(key.kind.path()));
    map.insert("course", OutlineFrontmatter::Text(&key.course));
    map.insert("subject", OutlineFrontmatter::Text(&key.subject));
    map.insert("exam_board", OutlineFrontmatter::Text(&key.exam_board));
    map.insert("questions", OutlineFrontmatter::Count(tree.question_count()));
    map.insert("topics", OutlineFrontmatter::Topics(&topics));

    let content = serde_yaml_ng::to_string(&map).context("failed to serialize outline")?;

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&path)
        .context(format!("failed to open file for {}", path))?;
    write!(file, "{}", content).context("failed to write outline")?;

    Ok(path)
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum OutlineFrontmatter<'a> {
    Text(&'a str),
    Count(usize),
    Topics(&'a [TopicOutline<'a>]),
}

#[derive(Serialize, Debug)]
struct TopicOutline<'a> {
    id: &'a str,
    name: &'a str,
    total_questions: usize,
    subsections: Vec<SubsectionOutline<'a>>,
}

#[derive(Serialize, Debug)]
struct SubsectionOutline<'a> {
    id: &'a str,
    slug: String,
    name: &'a str,
    questions: usize,
    marks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn defaults_to_exam_questions() {
        let config = parse_config(args(&["gcse", "maths", "aqa"])).unwrap();
        assert_eq!(config.key.kind, ContentKind::ExamQuestions);
        assert_eq!(config.output_dir, DEFAULT_OUTPUT_DIR);
    }

    #[test]
    fn reads_kind_and_output_dir() {
        let config =
            parse_config(args(&["alevel", "chemistry", "ocr", "past-papers", "out"])).unwrap();
        assert_eq!(config.key.kind, ContentKind::PastPapers);
        assert_eq!(config.key.exam_board, "ocr");
        assert_eq!(config.output_dir, "out");
    }

    #[test]
    fn missing_board_is_an_error() {
        assert!(parse_config(args(&["gcse", "maths"])).is_err());
    }

    fn outline_tree() -> ContentTree {
        studytrack::content::parse_envelope(serde_json::json!({
            "success": true,
            "data": [{
                "id": "t1",
                "name": "Mechanics",
                "subsections": [
                    {
                        "id": "s1",
                        "name": "Exam questions GCSE physics AQA",
                        "resourceUrl": "https://cdn.example.com/forces.pdf",
                        "questions": [
                            { "id": "q1", "text": "Unit of force?", "options": ["N", "J"], "correctOption": 0, "difficulty": "easy", "marks": 2, "explanation": "newton" },
                            { "id": "q2", "text": "F = ?", "options": ["ma", "mv"], "correctOption": 0, "difficulty": "medium", "marks": 3, "explanation": "second law" }
                        ]
                    },
                    {
                        "id": "s2",
                        "name": "Energy stores",
                        "questions": [
                            { "id": "q3", "text": "Unit of energy?", "options": ["N", "J"], "correctOption": 1, "difficulty": "easy", "marks": 1, "explanation": "joule" }
                        ]
                    }
                ]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn writes_outline_yaml() {
        let output_dir = env::temp_dir().join(format!("studytrack-outline-{}", std::process::id()));
        fs::create_dir_all(&output_dir).unwrap();
        let output_dir = output_dir.to_str().unwrap().to_string();

        let key = ContentKey::new(ContentKind::ExamQuestions, "gcse", "physics", "aqa");
        let path = write_outline(&outline_tree(), &key, &output_dir).unwrap();
        assert_eq!(path, format!("{}/exam-questions-gcse-physics-aqa.yaml", output_dir));

        let content = fs::read_to_string(&path).unwrap();
        fs::remove_dir_all(&output_dir).unwrap();
        let outline: serde_yaml_ng::Value = serde_yaml_ng::from_str(&content).unwrap();

        assert_eq!(outline["kind"].as_str(), Some("exam-questions"));
        assert_eq!(outline["exam_board"].as_str(), Some("aqa"));
        assert_eq!(outline["questions"].as_u64(), Some(3));

        let topic = &outline["topics"][0];
        assert_eq!(topic["name"].as_str(), Some("Mechanics"));
        assert_eq!(topic["total_questions"].as_u64(), Some(3));

        let subsections = &topic["subsections"];
        // subsection slugs do not collide with the file name
        assert_eq!(
            subsections[0]["slug"].as_str(),
            Some("exam-questions-gcse-physics-aqa")
        );
        assert_eq!(subsections[0]["questions"].as_u64(), Some(2));
        assert_eq!(subsections[0]["marks"].as_u64(), Some(5));
        assert_eq!(
            subsections[0]["resource"].as_str(),
            Some("https://cdn.example.com/forces.pdf")
        );

        assert_eq!(subsections[1]["slug"].as_str(), Some("energy-stores"));
        assert_eq!(subsections[1]["questions"].as_u64(), Some(1));
        assert!(subsections[1].get("resource").is_none());
    }
}
