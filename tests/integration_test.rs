use std::sync::Arc;

use quiz_autofill::browser::connect_to_browser_and_page;
use quiz_autofill::config::Config;
use quiz_autofill::infrastructure::JsExecutor;
use quiz_autofill::services::{ChromeHostPage, HostPage, PageControl};
use quiz_autofill::utils::logging;

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_browser_connection() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::from_env().expect("读取配置失败");

    // 测试浏览器连接
    let result = connect_to_browser_and_page(
        config.browser_debug_port,
        &config.target_url,
        config.target_title.as_deref(),
    )
    .await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore]
async fn test_lookups_on_live_page() {
    logging::init(true);
    let config = Config::from_env().expect("读取配置失败");

    let (_browser, page) = connect_to_browser_and_page(
        config.browser_debug_port,
        &config.target_url,
        config.target_title.as_deref(),
    )
    .await
    .expect("连接浏览器失败");

    let host = ChromeHostPage::attach(Arc::new(JsExecutor::new(page)))
        .await
        .expect("安装桥接失败");
    host.prepare().await.expect("创建隔离世界失败");

    assert!(host.is_connected().await);

    // 只读查找，不修改页面
    let options = host.type_options().await.expect("读取题型失败");
    println!("题型选项: {:?}", options);

    let editors = host.count_editors().await.expect("统计编辑器失败");
    println!("编辑器数量: {}", editors);
}

#[tokio::test]
#[ignore]
async fn test_bridge_receiver_installed_once() {
    logging::init(true);
    let config = Config::from_env().expect("读取配置失败");

    let (_browser, page) = connect_to_browser_and_page(
        config.browser_debug_port,
        &config.target_url,
        config.target_title.as_deref(),
    )
    .await
    .expect("连接浏览器失败");

    let executor = Arc::new(JsExecutor::new(page));
    let _host = ChromeHostPage::attach(Arc::clone(&executor))
        .await
        .expect("安装桥接失败");

    // 再次执行时守卫生效
    let status = executor
        .eval(quiz_autofill::bridge::BRIDGE_RECEIVER_JS)
        .await
        .expect("执行桥接脚本失败");
    assert_eq!(status.as_str(), Some("already-installed"));
}

#[tokio::test]
#[ignore]
async fn test_bridge_receiver_guards_on_live_page() {
    use quiz_autofill::bridge::{BridgeAction, Dispatcher};

    logging::init(true);
    let config = Config::from_env().expect("读取配置失败");

    let (_browser, page) = connect_to_browser_and_page(
        config.browser_debug_port,
        &config.target_url,
        config.target_title.as_deref(),
    )
    .await
    .expect("连接浏览器失败");

    let executor = Arc::new(JsExecutor::new(page));
    let host = ChromeHostPage::attach(Arc::clone(&executor))
        .await
        .expect("安装桥接失败");
    host.prepare().await.expect("创建隔离世界失败");
    let dispatcher = Dispatcher::new(host.channel());

    // 主世界里统计 console.error 和题型下拉框的 change 事件
    executor
        .eval(
            r#"(() => {
                window.__quizAutofillErrors = 0;
                const original = console.error;
                console.error = (...args) => { window.__quizAutofillErrors++; original(...args); };
                window.__quizAutofillTypeChanges = 0;
                const select = document.querySelector('select#Type, select[name="Type"]');
                if (select) select.addEventListener('change', () => window.__quizAutofillTypeChanges++);
                return true;
            })()"#,
        )
        .await
        .expect("安装计数器失败");

    let snapshot = r#"JSON.stringify({
        editors: Array.from(document.querySelectorAll('.note-editable')).map(el => el.innerHTML),
        type: (document.querySelector('select#Type, select[name="Type"]') || {}).value || null
    })"#;
    let before = executor.eval(snapshot).await.expect("读取页面失败");

    // 下标超出编辑器数量：什么都不做
    dispatcher
        .send(&BridgeAction::inject(99, "<b>should not appear</b>"))
        .await
        .expect("派发 inject 失败");

    // 与当前值相同：不触发 change
    let type_value = executor
        .eval(r#"(document.querySelector('select#Type, select[name="Type"]') || {}).value || null"#)
        .await
        .expect("读取题型值失败");
    if let Some(value) = type_value.as_str() {
        dispatcher
            .send(&BridgeAction::change_type(value))
            .await
            .expect("派发 change-type 失败");
    }

    let after = executor.eval(snapshot).await.expect("读取页面失败");
    assert_eq!(before, after, "页面内容不应变化");

    let counters = executor
        .eval("[window.__quizAutofillErrors, window.__quizAutofillTypeChanges]")
        .await
        .expect("读取计数器失败");
    assert_eq!(counters, serde_json::json!([0, 0]));

    // 不可编辑的编辑器：insertHTML 失败后直接写 innerHTML
    let index = executor
        .eval(
            r#"(() => {
                const el = document.createElement('div');
                el.className = 'note-editable';
                el.id = 'quiz-autofill-fallback-target';
                document.body.appendChild(el);
                return document.querySelectorAll('.note-editable').length - 1;
            })()"#,
        )
        .await
        .expect("创建测试编辑器失败")
        .as_u64()
        .expect("编辑器下标") as usize;

    dispatcher
        .send(&BridgeAction::inject(index, "<b>fallback</b>"))
        .await
        .expect("派发 inject 失败");

    let written = executor
        .eval(
            r#"(() => {
                const el = document.getElementById('quiz-autofill-fallback-target');
                const html = el ? el.innerHTML : null;
                if (el) el.remove();
                return html;
            })()"#,
        )
        .await
        .expect("读取测试编辑器失败");
    assert_eq!(written.as_str(), Some("<b>fallback</b>"));
}
