//! End-to-end build jobs against a fake toolchain.

#![cfg(unix)]

mod common;

use common::{Install, submission};
use std::time::{Duration, Instant};
use swab::{
    ArtifactSelector, SwabError,
    bundler::{JobStatus, Platform, PlatformOutcome, ValidationError},
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn failed_platform_does_not_fail_the_job() {
    let install = Install::new(&["apk"]);
    let service = install.service();

    let id = service.submit(submission(&["android", "web"])).unwrap();
    let job = service.wait(&id).await.unwrap();

    assert_eq!(job.status, JobStatus::Completed, "{job:?}");
    assert_eq!(job.progress, 100);
    assert_eq!(job.message, "Build completed!");
    assert!(job.error.is_none());

    let android = &job.outputs[&Platform::Android];
    assert!(matches!(android, PlatformOutcome::Failed(_)));
    assert!(android.to_string().starts_with("Error: "));

    let web = job.outputs[&Platform::Web].path().unwrap();
    assert!(web.is_file());
    assert_eq!(web.file_name().unwrap(), "cornershop_web.zip");

    // Workspace removed, outputs kept.
    let job_dir = install.base_dir().join("builds").join(id.to_string());
    assert!(!job_dir.join("project").exists());
    assert!(job_dir.join("outputs").is_dir());
}

#[tokio::test]
async fn artifacts_follow_recorded_outcomes() {
    let install = Install::new(&["apk"]);
    let service = install.service();

    let id = service.submit(submission(&["android", "web"])).unwrap();
    service.wait(&id).await.unwrap();

    let web = service
        .artifact(&id, ArtifactSelector::Platform(Platform::Web))
        .await
        .unwrap();
    assert_eq!(web.sha256.len(), 64);
    assert!(web.size > 0);

    let err = service
        .artifact(&id, ArtifactSelector::Platform(Platform::Android))
        .await
        .unwrap_err();
    match err {
        SwabError::PlatformFailed { platform, message } => {
            assert_eq!(platform, Platform::Android);
            assert!(message.contains("simulated apk failure"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = service
        .artifact(&id, ArtifactSelector::Platform(Platform::Linux))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let bundle = service
        .artifact(&id, ArtifactSelector::KeystoreBundle)
        .await
        .unwrap();
    assert_eq!(bundle.file_name, "keystore-bundle.zip");
}

#[tokio::test]
async fn missing_entry_point_is_a_hard_failure() {
    let install = Install::new(&[]);
    std::fs::remove_file(install.template.join("lib/main.dart")).unwrap();
    let service = install.service();

    let id = service.submit(submission(&["web"])).unwrap();
    let job = service.wait(&id).await.unwrap();

    assert_eq!(job.status, JobStatus::Error);
    assert!(job.outputs.is_empty());
    let error = job.error.as_deref().unwrap();
    assert!(error.contains("lib/main.dart"), "{error}");
    assert!(job.message.starts_with("Build failed: "));
    assert_eq!(job.progress, 10);
    assert!(
        !install
            .base_dir()
            .join("builds")
            .join(id.to_string())
            .join("project")
            .exists()
    );
    assert!(install.calls("flutter").iter().all(|c| !c.starts_with("build")));
}

#[tokio::test]
async fn dependency_resolution_failure_aborts_before_building() {
    let install = Install::new(&["get"]);
    let service = install.service();

    let id = service.submit(submission(&["web", "linux"])).unwrap();
    let job = service.wait(&id).await.unwrap();

    assert_eq!(job.status, JobStatus::Error);
    assert_eq!(job.progress, 22);
    assert!(job.outputs.is_empty());
    assert!(install.calls("flutter").iter().all(|c| !c.starts_with("build")));
}

#[tokio::test]
async fn one_keystore_serves_both_android_targets() {
    let install = Install::new(&[]);
    let service = install.service();

    let id = service
        .submit(submission(&["android", "android-bundle"]))
        .unwrap();
    let job = service.wait(&id).await.unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(install.calls("keytool").len(), 1);
    assert!(job.keystore_generated);

    let keystore = job.keystore_path.as_deref().unwrap();
    assert!(keystore.is_file());
    let info = std::fs::read_to_string(job.keystore_info_path.as_deref().unwrap()).unwrap();
    assert!(info.contains("release"));

    assert!(job.outputs[&Platform::Android].path().unwrap().is_file());
    assert!(job.outputs[&Platform::AndroidBundle].path().unwrap().is_file());
}

#[tokio::test]
async fn concurrent_keystore_bundle_requests_agree() {
    let install = Install::new(&[]);
    let service = install.service();

    let id = service.submit(submission(&["android"])).unwrap();
    service.wait(&id).await.unwrap();

    let (a, b) = tokio::join!(
        service.artifact(&id, ArtifactSelector::KeystoreBundle),
        service.artifact(&id, ArtifactSelector::KeystoreBundle),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.path, b.path);
    assert_eq!(a.sha256, b.sha256);

    let file = std::fs::File::open(&a.path).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    assert!(archive.file_names().any(|n| n.ends_with(".jks")));

    let again = service
        .artifact(&id, ArtifactSelector::KeystoreBundle)
        .await
        .unwrap();
    assert_eq!(again.sha256, a.sha256);
}

#[tokio::test]
async fn supplied_keystore_suppresses_generation() {
    let install = Install::new(&[]);
    let keystore = install.base_dir().join("mine.jks");
    std::fs::write(&keystore, b"jks").unwrap();
    let service = install.service();

    let mut request = submission(&["android"]);
    request["keystore_path"] = keystore.display().to_string().into();
    request["keystore_password"] = "secret".into();
    request["key_alias"] = "upload".into();
    request["key_password"] = "secret".into();

    let id = service.submit(request).unwrap();
    let job = service.wait(&id).await.unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert!(install.calls("keytool").is_empty());
    assert!(!job.keystore_generated);
    assert!(job.keystore_path.is_none());

    let err = service
        .artifact(&id, ArtifactSelector::KeystoreBundle)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn job_is_visible_at_once_and_progress_never_decreases() {
    let install = Install::new(&[]);
    let service = install.service();

    let id = service.submit(submission(&["web", "linux", "windows"])).unwrap();
    let first = service.status(&id).unwrap();
    assert_eq!(first.platforms, vec![Platform::Web, Platform::Linux, Platform::Windows]);

    let mut seen = vec![first.progress];
    let mut statuses = vec![first.status];
    let deadline = Instant::now() + Duration::from_secs(60);
    loop {
        let job = service.status(&id).unwrap();
        seen.push(job.progress);
        statuses.push(job.status);
        if job.is_terminal() || Instant::now() > deadline {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
    assert!(statuses.windows(2).all(|w| w[0] <= w[1]), "{statuses:?}");
    assert_eq!(*statuses.last().unwrap(), JobStatus::Completed);
}

#[tokio::test]
async fn polled_jobs_release_their_workers() {
    let install = Install::new(&[]);
    let service = install.service();

    let id = service.submit(submission(&["web"])).unwrap();
    assert_eq!(service.orchestrator().active_tasks(), 1);

    let deadline = Instant::now() + Duration::from_secs(60);
    while service.orchestrator().active_tasks() > 0 && Instant::now() < deadline {
        service.status(&id).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(service.orchestrator().active_tasks(), 0);
    let job = service.wait(&id).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
}

#[tokio::test]
async fn invalid_submissions_create_no_job() {
    let install = Install::new(&[]);
    let service = install.service();

    let mut request = submission(&["web"]);
    request.as_object_mut().unwrap().remove("app_name");
    let err = service.submit(request).unwrap_err();
    assert!(matches!(
        err,
        SwabError::Validation(ValidationError::MissingField("app_name"))
    ));

    let err = service.submit(submission(&[])).unwrap_err();
    assert!(matches!(err, SwabError::Validation(ValidationError::NoPlatforms)));

    let err = service.submit(submission(&["tizen"])).unwrap_err();
    assert!(matches!(
        err,
        SwabError::Validation(ValidationError::UnsupportedPlatform(_))
    ));

    assert!(service.orchestrator().registry().is_empty());
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let install = Install::new(&[]);
    let service = install.service();
    let id = uuid::Uuid::new_v4();

    assert!(matches!(service.status(&id), Err(SwabError::JobNotFound(_))));
    let err = service
        .artifact(&id, ArtifactSelector::Platform(Platform::Web))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn webhook_receives_terminal_payload() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let body = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let length = text[..split]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if buf.len() >= split + 4 + length {
                    break text[split + 4..split + 4 + length].to_string();
                }
            }
            if n == 0 {
                break String::new();
            }
        };
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n")
            .await
            .unwrap();
        body
    });

    let install = Install::new(&["web"]);
    let service = install.service();
    let mut request = submission(&["web"]);
    request["webhook_url"] = format!("http://{addr}/hook").into();

    let id = service.submit(request).unwrap();
    service.wait(&id).await.unwrap();

    let body = tokio::time::timeout(Duration::from_secs(10), server)
        .await
        .unwrap()
        .unwrap();
    let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload["build_id"], id.to_string());
    assert_eq!(payload["status"], "completed");
    assert_eq!(payload["platforms"], serde_json::json!(["web"]));
    assert!(
        payload["outputs"]["web"]
            .as_str()
            .unwrap()
            .starts_with("Error: ")
    );
}

#[tokio::test]
async fn unreachable_webhook_does_not_delay_completion() {
    // Accepts but never answers.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let install = Install::new(&[]);
    let service = install.service();
    let mut request = submission(&["web"]);
    request["webhook_url"] = format!("http://{addr}/hook").into();

    let started = Instant::now();
    let id = service.submit(request).unwrap();
    let job = service.wait(&id).await.unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert!(started.elapsed() < Duration::from_secs(4), "{:?}", started.elapsed());
    drop(listener);
}
