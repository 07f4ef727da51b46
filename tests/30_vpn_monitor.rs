mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use uuid::Uuid;

use common::{monitor, nas, peer, FailingNasStore, ParkedProbe, ScriptedProbe, HANDSHAKE_TIMEOUT};
use ispmgr_core::database::{MemoryStore, NasStatus, StoreWrite};
use ispmgr_core::vpn::{MonitorError, MonitorScheduler, TickResult, VpnConnectivityMonitor};

#[tokio::test]
async fn tick_reconciles_a_fleet() -> Result<()> {
    let now = Utc::now();
    let tenant_id = Uuid::new_v4();
    let store = Arc::new(MemoryStore::new());

    // Matched by key, fresh handshake, was pending
    let fresh = nas(tenant_id, "core-1", "10.8.0.2", Some("PK-CORE"), NasStatus::Pending);
    // Matched by address, stale handshake, was online
    let stale = nas(tenant_id, "tower-2", "10.8.0.3", None, NasStatus::Online);
    // No peer at all, already offline
    let dark = nas(tenant_id, "tower-3", "10.8.0.4", None, NasStatus::Offline);
    for row in [&fresh, &stale, &dark] {
        store.insert_nas(row.clone()).await;
    }

    let probe = ScriptedProbe::new(Some(vec![
        peer("PK-CORE", "10.8.0.2/32", Some(now - ChronoDuration::seconds(30))),
        peer("PK-OTHER", "10.8.0.3/32", Some(now - ChronoDuration::seconds(600))),
    ]));
    let result = monitor(probe, store.clone()).tick_at(now).await;

    assert_eq!(
        result,
        TickResult {
            updated: 2,
            online: 1,
            offline: 2
        }
    );
    assert_eq!(store.nas(fresh.id).await.unwrap().status, NasStatus::Online);
    assert_eq!(store.nas(fresh.id).await.unwrap().last_seen, Some(now));
    assert_eq!(store.nas(stale.id).await.unwrap().status, NasStatus::Offline);
    assert_eq!(store.nas(dark.id).await.unwrap().status, NasStatus::Offline);

    let writes = store.writes().await;
    assert!(writes.contains(&StoreWrite::NasStatus {
        id: stale.id,
        status: NasStatus::Offline,
        last_seen: None
    }));
    assert!(!writes.iter().any(|w| matches!(w, StoreWrite::NasStatus { id, .. } if *id == dark.id)));
    Ok(())
}

#[tokio::test]
async fn connected_nas_gets_heartbeat_without_transition() -> Result<()> {
    let now = Utc::now();
    let store = Arc::new(MemoryStore::new());
    let row = nas(Uuid::new_v4(), "core", "10.8.0.2", Some("PK"), NasStatus::Online);
    store.insert_nas(row.clone()).await;

    let probe = ScriptedProbe::new(Some(vec![peer("PK", "10.8.0.2/32", Some(now))]));
    let result = monitor(probe, store.clone()).tick_at(now).await;

    assert_eq!(result.updated, 0);
    assert_eq!(store.writes().await, vec![StoreWrite::NasHeartbeat { id: row.id, at: now }]);
    Ok(())
}

#[tokio::test]
async fn failed_write_is_skipped_and_the_tick_continues() -> Result<()> {
    let now = Utc::now();
    let tenant_id = Uuid::new_v4();
    let store = Arc::new(MemoryStore::new());
    let broken = nas(tenant_id, "core-1", "10.8.0.2", Some("PK-A"), NasStatus::Pending);
    let healthy = nas(tenant_id, "core-2", "10.8.0.3", Some("PK-B"), NasStatus::Pending);
    let beating = nas(tenant_id, "core-3", "10.8.0.4", Some("PK-C"), NasStatus::Online);
    for row in [&broken, &healthy, &beating] {
        store.insert_nas(row.clone()).await;
    }

    let failing = Arc::new(FailingNasStore {
        inner: store.clone(),
        fail_id: broken.id,
    });
    let probe = ScriptedProbe::new(Some(vec![
        peer("PK-A", "10.8.0.2/32", Some(now)),
        peer("PK-B", "10.8.0.3/32", Some(now)),
        peer("PK-C", "10.8.0.4/32", Some(now)),
    ]));
    let monitor = VpnConnectivityMonitor::new(probe, failing, HANDSHAKE_TIMEOUT, Duration::from_secs(5));
    let result = monitor.tick_at(now).await;

    assert_eq!(
        result,
        TickResult {
            updated: 1,
            online: 3,
            offline: 0
        }
    );
    assert_eq!(store.nas(broken.id).await.unwrap().status, NasStatus::Pending);
    assert_eq!(store.nas(healthy.id).await.unwrap().status, NasStatus::Online);
    assert_eq!(
        store.writes().await,
        vec![
            StoreWrite::NasStatus {
                id: healthy.id,
                status: NasStatus::Online,
                last_seen: Some(now)
            },
            StoreWrite::NasHeartbeat { id: beating.id, at: now },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn failed_heartbeat_does_not_stop_the_tick() -> Result<()> {
    let now = Utc::now();
    let tenant_id = Uuid::new_v4();
    let store = Arc::new(MemoryStore::new());
    let broken = nas(tenant_id, "core-1", "10.8.0.2", Some("PK-A"), NasStatus::Online);
    let healthy = nas(tenant_id, "core-2", "10.8.0.3", Some("PK-B"), NasStatus::Online);
    for row in [&broken, &healthy] {
        store.insert_nas(row.clone()).await;
    }

    let failing = Arc::new(FailingNasStore {
        inner: store.clone(),
        fail_id: broken.id,
    });
    let probe = ScriptedProbe::new(Some(vec![
        peer("PK-A", "10.8.0.2/32", Some(now)),
        peer("PK-B", "10.8.0.3/32", Some(now)),
    ]));
    let monitor = VpnConnectivityMonitor::new(probe, failing, HANDSHAKE_TIMEOUT, Duration::from_secs(5));
    let result = monitor.tick_at(now).await;

    assert_eq!(result.updated, 0);
    assert_eq!(result.online, 2);
    assert_eq!(store.nas(broken.id).await.unwrap().last_seen, None);
    assert_eq!(store.writes().await, vec![StoreWrite::NasHeartbeat { id: healthy.id, at: now }]);
    Ok(())
}

#[tokio::test]
async fn failed_probe_leaves_everything_alone() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_nas(nas(Uuid::new_v4(), "core", "10.8.0.2", Some("PK"), NasStatus::Online))
        .await;

    let probe = ScriptedProbe::new(None);
    let result = monitor(probe.clone(), store.clone()).tick().await;

    assert_eq!(result, TickResult::default());
    assert_eq!(probe.calls(), 1);
    assert!(store.writes().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn tenant_status_uses_one_probe_run() -> Result<()> {
    let now = Utc::now();
    let tenant_id = Uuid::new_v4();
    let store = Arc::new(MemoryStore::new());
    let mut up = nas(tenant_id, "a-core", "10.8.0.2/32", Some("PK-A"), NasStatus::Online);
    up.uptime = Some("3d 4h 5m".to_string());
    let mut down = nas(tenant_id, "b-edge", "10.8.0.9", None, NasStatus::Offline);
    down.last_seen = Some(now - ChronoDuration::minutes(90));
    store.insert_nas(up.clone()).await;
    store.insert_nas(down.clone()).await;
    store
        .insert_nas(nas(Uuid::new_v4(), "foreign", "10.8.1.2", None, NasStatus::Online))
        .await;

    let probe = ScriptedProbe::new(Some(vec![peer("PK-A", "10.8.0.2/32", Some(now - ChronoDuration::seconds(5)))]));
    let monitor = monitor(probe.clone(), store.clone());
    let statuses = monitor.status_for_tenant_at(tenant_id, now).await?;

    assert_eq!(probe.calls(), 1);
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].nas_id, up.id);
    assert!(statuses[0].is_connected);
    assert_eq!(statuses[0].uptime.as_deref(), Some("3d 4h 5m"));
    assert_eq!(statuses[0].rx_bytes, 4096);
    assert!(!statuses[1].is_connected);
    assert_eq!(statuses[1].offline_duration.as_deref(), Some("1h 30m"));

    // Status queries never write
    assert!(store.writes().await.is_empty());

    // Nothing to show, nothing to probe
    assert!(monitor.status_for_tenant_at(Uuid::new_v4(), now).await?.is_empty());
    assert_eq!(probe.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn single_status_falls_back_to_persisted_state() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let row = nas(Uuid::new_v4(), "core", "10.8.0.2", Some("PK"), NasStatus::Online);
    store.insert_nas(row.clone()).await;

    let monitor = monitor(ScriptedProbe::new(None), store);
    let status = monitor.status(row.id).await?;
    assert!(!status.live);
    assert!(status.is_connected);

    assert!(matches!(
        monitor.status(Uuid::new_v4()).await,
        Err(MonitorError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn try_tick_refuses_while_a_tick_runs() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let probe = Arc::new(ParkedProbe::default());
    let monitor = Arc::new(monitor(probe.clone(), store));

    let running = tokio::spawn({
        let monitor = monitor.clone();
        async move { monitor.tick().await }
    });
    probe.entered.notified().await;

    assert_eq!(monitor.try_tick().await, None);

    probe.release.notify_one();
    assert_eq!(running.await?, TickResult::default());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn scheduler_runs_until_stopped() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let probe = ScriptedProbe::new(Some(Vec::new()));
    let monitor = Arc::new(monitor(probe.clone(), store));

    let mut scheduler = MonitorScheduler::new(monitor, Duration::from_secs(60));
    scheduler.start();
    tokio::time::sleep(Duration::from_secs(125)).await;
    assert_eq!(probe.calls(), 3);

    scheduler.stop().await;
    assert!(!scheduler.is_running());
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(probe.calls(), 3);

    // Stopping twice is harmless
    scheduler.stop().await;
    Ok(())
}
