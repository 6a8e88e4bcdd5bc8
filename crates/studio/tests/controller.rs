/// End-to-end orchestration tests against the scriptable mock gateway.

use std::sync::Arc;
use std::time::Duration;
use storyboard::{data_url, AspectRatio, ContentFormat, ScriptFormat};

use genai::{GatewayCall, GenerationError, MockGateway, ParsedScript};
use studio::{
    EditOutcome, EditTarget, GenerationSettings, PackageSource, StudioController, StudioError,
};

fn controller() -> (Arc<MockGateway>, StudioController) {
    let gateway = Arc::new(MockGateway::new());
    let controller = StudioController::new(gateway.clone());
    (gateway, controller)
}

async fn create_stock_package(controller: &StudioController) {
    controller
        .create_package(PackageSource::Topic("ocean cleanup".into()), ContentFormat::Reel)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_topic_rejected_before_any_call() {
    let (gateway, controller) = controller();
    let err = controller
        .create_package(PackageSource::Topic("   ".into()), ContentFormat::Reel)
        .await
        .unwrap_err();
    assert!(matches!(err, StudioError::Validation(_)));
    assert!(gateway.calls().is_empty());
    assert!(controller.snapshot().package.is_none());
}

#[tokio::test]
async fn test_create_from_topic_builds_numbered_package() {
    let (gateway, controller) = controller();
    create_stock_package(&controller).await;

    let session = controller.snapshot();
    let package = session.package.unwrap();
    assert_eq!(package.topic, "ocean cleanup");
    assert_eq!(package.thumbnail.title, "About ocean cleanup");
    assert!(package.thumbnail.image_url.starts_with("data:image/png;base64,"));
    let numbers: Vec<u32> = package.scenes.iter().map(|s| s.scene_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(package.scenes.iter().all(|s| s.image_url.is_none()));
    assert!(session.characters.is_empty());

    let calls = gateway.calls();
    assert!(matches!(&calls[0], GatewayCall::Script { topic, scene_count, .. }
        if topic == "ocean cleanup" && *scene_count == 7));
    assert!(matches!(&calls[1], GatewayCall::Image { reference_images, .. }
        if reference_images.is_empty()));
}

#[tokio::test]
async fn test_create_from_script_extracts_characters() {
    let (gateway, controller) = controller();
    let stock = MockGateway::stock_script("The Lighthouse Keeper");
    gateway.push_parse(Ok(ParsedScript {
        title: stock.title.clone(),
        scenes: stock.scenes,
        characters: Some(vec!["Ada Vale".into(), "Marcus Reed".into()]),
    }));

    controller
        .create_package(
            PackageSource::Script {
                text: "FADE IN...".into(),
                format: ScriptFormat::SceneByScene,
                character_descriptions: Some("Ada Vale:\nRed coat.".into()),
            },
            ContentFormat::LongForm,
        )
        .await
        .unwrap();

    let session = controller.snapshot();
    let package = session.package.unwrap();
    assert_eq!(package.topic, "The Lighthouse Keeper");
    assert_eq!(package.format, ContentFormat::LongForm);
    let names: Vec<&str> = session.characters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Ada Vale", "Marcus Reed"]);
    assert!(session.characters.iter().all(|c| c.image_url.is_none()));
    assert_eq!(session.character_descriptions, "Ada Vale:\nRed coat.");

    assert!(matches!(&gateway.calls()[0], GatewayCall::Parse {
        script_format: ScriptFormat::SceneByScene,
        with_character_descriptions: true,
    }));
}

#[tokio::test]
async fn test_failed_creation_leaves_state_untouched() {
    let (gateway, controller) = controller();
    create_stock_package(&controller).await;

    // thumbnail render fails on the second attempt
    gateway.push_image(Err(GenerationError::NoImage("image generation".into())));
    let err = controller
        .create_package(PackageSource::Topic("volcanoes".into()), ContentFormat::Reel)
        .await
        .unwrap_err();
    assert!(matches!(err, StudioError::Generation(_)));

    let package = controller.snapshot().package.unwrap();
    assert_eq!(package.topic, "ocean cleanup");
}

#[tokio::test]
async fn test_scene_image_uses_earlier_scenes_and_sets_action_prompt() {
    let (gateway, controller) = controller();
    create_stock_package(&controller).await;
    controller.generate_scene_image(0).await.unwrap();
    controller.generate_scene_image(1).await.unwrap();

    let package = controller.snapshot().package.unwrap();
    assert!(package.scenes[1].image_url.is_some());
    assert!(package.scenes[1].action_prompt.is_some());
    assert!(!package.scenes[1].is_loading);
    assert_eq!(package.scenes[1].revision, 1);

    // scene 2's request: thumbnail plus scene 1's image, nothing later
    let calls = gateway.calls();
    let GatewayCall::Image { reference_images, .. } = &calls[4] else {
        panic!("expected image call, got {:?}", calls[4]);
    };
    assert_eq!(
        reference_images,
        &vec![
            package.thumbnail.image_url.clone(),
            package.scenes[0].image_url.clone().unwrap(),
        ]
    );
}

#[tokio::test]
async fn test_regenerate_scene_sees_later_scene_images() {
    let (gateway, controller) = controller();
    create_stock_package(&controller).await;
    controller.generate_scene_image(2).await.unwrap();
    controller.regenerate_scene_image(0).await.unwrap();

    let package = controller.snapshot().package.unwrap();
    let calls = gateway.calls();
    let last_image = calls
        .iter()
        .rev()
        .find(|c| matches!(c, GatewayCall::Image { .. }))
        .unwrap();
    let GatewayCall::Image { reference_images, .. } = last_image else {
        unreachable!();
    };
    assert!(reference_images.contains(package.scenes[2].image_url.as_ref().unwrap()));
}

#[tokio::test]
async fn test_action_prompt_failure_still_commits_image() {
    let (gateway, controller) = controller();
    create_stock_package(&controller).await;
    gateway.push_action(Err(GenerationError::InvalidResponse(
        "action prompt was not valid JSON".into(),
    )));

    let err = controller.generate_scene_image(0).await.unwrap_err();
    assert!(matches!(err, StudioError::Generation(_)));

    let scene = &controller.snapshot().package.unwrap().scenes[0];
    assert!(scene.image_url.is_some());
    assert!(scene.action_prompt.is_none());
    assert!(!scene.is_loading);
    assert_eq!(scene.revision, 1);
}

#[tokio::test]
async fn test_failed_scene_image_clears_loading_flag() {
    let (gateway, controller) = controller();
    create_stock_package(&controller).await;
    gateway.push_image(Err(GenerationError::Transport("timed out".into())));

    assert!(controller.generate_scene_image(0).await.is_err());
    let scene = &controller.snapshot().package.unwrap().scenes[0];
    assert!(!scene.is_loading);
    assert!(scene.image_url.is_none());
    assert_eq!(scene.revision, 0);
}

#[tokio::test]
async fn test_stale_scene_write_is_discarded() {
    let (gateway, controller) = controller();
    create_stock_package(&controller).await;

    let slow = data_url::encode("image/png", b"slow-result");
    let fast = data_url::encode("image/png", b"fast-result");
    gateway.push_image(Ok(slow));
    gateway.push_image(Ok(fast.clone()));
    gateway.delay_next_image(Duration::from_millis(50));

    // the delayed operation starts first but finishes last
    let (a, b) = tokio::join!(
        controller.generate_scene_image(0),
        controller.regenerate_scene_image(0),
    );
    a.unwrap();
    b.unwrap();

    let scene = &controller.snapshot().package.unwrap().scenes[0];
    assert_eq!(scene.image_url.as_deref(), Some(fast.as_str()));
    assert_eq!(scene.revision, 1);
    assert!(!scene.is_loading);
}

#[tokio::test]
async fn test_thumbnail_regeneration_bumps_revision() {
    let (gateway, controller) = controller();
    create_stock_package(&controller).await;
    controller.generate_scene_image(0).await.unwrap();

    let before = controller.snapshot().package.unwrap();
    controller.regenerate_thumbnail().await.unwrap();
    let after = controller.snapshot().package.unwrap();

    assert_ne!(after.thumbnail.image_url, before.thumbnail.image_url);
    assert_eq!(after.thumbnail.revision, 1);

    // the request carries every generated image as context
    let calls = gateway.calls();
    let GatewayCall::Image { prompt, reference_images, .. } =
        calls.iter().rev().find(|c| matches!(c, GatewayCall::Image { .. })).unwrap()
    else {
        unreachable!();
    };
    assert!(prompt.contains(&before.thumbnail.title));
    assert!(reference_images.contains(&before.thumbnail.image_url));
    assert!(reference_images.contains(before.scenes[0].image_url.as_ref().unwrap()));
}

#[tokio::test]
async fn test_character_portrait_uses_matching_description_block() {
    let (gateway, controller) = controller();
    let stock = MockGateway::stock_script("T");
    gateway.push_parse(Ok(ParsedScript {
        title: stock.title.clone(),
        scenes: stock.scenes,
        characters: Some(vec!["Ada Vale".into(), "Marcus Reed".into()]),
    }));
    controller
        .create_package(
            PackageSource::Script {
                text: "script".into(),
                format: ScriptFormat::UserMaterial,
                character_descriptions: Some(
                    "Name: Ada Vale\nTall, red coat, silver hair.\n\nNotes without a name line."
                        .into(),
                ),
            },
            ContentFormat::Reel,
        )
        .await
        .unwrap();

    controller.generate_character_image(0).await.unwrap();
    controller.generate_character_image(1).await.unwrap();

    let session = controller.snapshot();
    assert!(session.characters[0].image_url.is_some());
    assert_eq!(session.characters[0].revision, 1);

    let image_calls: Vec<_> = gateway
        .calls()
        .into_iter()
        .filter(|c| matches!(c, GatewayCall::Image { .. }))
        .collect();
    // thumbnail, then the two portraits
    let GatewayCall::Image { prompt, aspect_ratio, reference_images } = &image_calls[1] else {
        unreachable!();
    };
    assert!(prompt.contains("Tall, red coat, silver hair."));
    assert_eq!(*aspect_ratio, AspectRatio::Square);
    assert!(reference_images.is_empty());

    // no matching block: generic prompt from the name alone
    let GatewayCall::Image { prompt, .. } = &image_calls[2] else {
        unreachable!();
    };
    assert!(prompt.contains("Marcus Reed"));
    assert!(!prompt.contains("red coat"));
}

#[tokio::test]
async fn test_whitespace_edit_instruction_is_a_no_op() {
    let (gateway, controller) = controller();
    create_stock_package(&controller).await;
    let calls_before = gateway.calls().len();

    let outcome = controller
        .edit_image(EditTarget::Thumbnail, "  \n ")
        .await
        .unwrap();
    assert_eq!(outcome, EditOutcome::Skipped);
    assert_eq!(gateway.calls().len(), calls_before);
}

#[tokio::test]
async fn test_scene_edit_requires_an_existing_image() {
    let (_gateway, controller) = controller();
    create_stock_package(&controller).await;

    let err = controller
        .edit_image(EditTarget::Scene(0), "make it rain")
        .await
        .unwrap_err();
    assert!(matches!(err, StudioError::Validation(_)));
}

#[tokio::test]
async fn test_scene_edit_refreshes_action_prompt() {
    let (gateway, controller) = controller();
    create_stock_package(&controller).await;
    controller.generate_scene_image(0).await.unwrap();
    let before = controller.snapshot().package.unwrap().scenes[0].clone();

    let outcome = controller
        .edit_image(EditTarget::Scene(0), "make it rain")
        .await
        .unwrap();
    assert_eq!(outcome, EditOutcome::Applied);

    let after = controller.snapshot().package.unwrap().scenes[0].clone();
    assert_ne!(after.image_url, before.image_url);
    assert_eq!(after.revision, 2);

    // the refreshed prompt was derived from the edited image
    let calls = gateway.calls();
    let GatewayCall::ActionPrompt { scene_image, .. } = calls.last().unwrap() else {
        panic!("expected action prompt call, got {:?}", calls.last());
    };
    assert_eq!(scene_image, after.image_url.as_ref().unwrap());
    assert!(matches!(&calls[calls.len() - 2], GatewayCall::Edit { source_image, instruction }
        if source_image == before.image_url.as_ref().unwrap() && instruction == "make it rain"));
}

#[tokio::test]
async fn test_export_requires_a_package() {
    let (_gateway, controller) = controller();
    assert!(matches!(controller.export(), Err(StudioError::NoPackage)));
}

#[tokio::test]
async fn test_export_names_archive_after_topic() {
    let (_gateway, controller) = controller();
    create_stock_package(&controller).await;
    controller.generate_scene_image(0).await.unwrap();

    let (name, bytes) = controller.export().unwrap();
    assert_eq!(name, "reel-package-ocean_cleanup.zip");

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let entries: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(entries.contains(&"thumbnail.png".to_string()));
    assert!(entries.contains(&"scenes/scene_1.png".to_string()));
    assert!(entries.contains(&"scenes/scene_1_prompt.json".to_string()));
    assert!(entries.contains(&"script.txt".to_string()));
}

#[tokio::test]
async fn test_clear_discards_everything() {
    let (_gateway, controller) = controller();
    create_stock_package(&controller).await;
    controller.set_character_descriptions("Ada:\nRed coat.");
    controller.clear();

    let session = controller.snapshot();
    assert!(session.package.is_none());
    assert!(session.characters.is_empty());
    assert!(session.character_descriptions.is_empty());
}

#[tokio::test]
async fn test_settings_drive_scene_count_and_aspect_ratio() {
    let (gateway, controller) = controller();
    controller.update_settings(
        GenerationSettings::default()
            .with_scene_count(4)
            .with_aspect_ratio(AspectRatio::Portrait)
            .with_tone("upbeat"),
    );
    create_stock_package(&controller).await;

    let calls = gateway.calls();
    assert!(matches!(&calls[0], GatewayCall::Script { scene_count: 4, tone, .. }
        if tone == "upbeat"));
    assert!(matches!(&calls[1], GatewayCall::Image { aspect_ratio: AspectRatio::Portrait, .. }));
}
