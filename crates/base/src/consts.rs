pub mod k8s {
    pub mod annotations {
        /// Set on a pod template once the init container has been added. Its
        /// presence alone marks the template as injected.
        pub const LINKERD_DAEMONSET: &str = "alpha.istio.io/linkerd-daemonset";
        pub const LINKERD_DAEMONSET_INJECTED: &str = "injected";

        /// JSON list of init container definitions, read by the kubelet before
        /// `spec.initContainers` existed.
        pub const INIT_CONTAINERS: &str = "pod.beta.kubernetes.io/init-containers";
    }

    pub mod init_container {
        pub const NAME: &str = "init-linkerd";
        pub const IMAGE: &str = "linkerd/istio-init:v1";
        pub const IMAGE_PULL_POLICY: &str = "IfNotPresent";
        pub const CAPABILITY_NET_ADMIN: &str = "NET_ADMIN";

        pub const NODE_NAME_ENV: &str = "NODE_NAME";
        pub const NODE_NAME_FIELD_PATH: &str = "spec.nodeName";
        // kubernetes/kubernetes#39189: the field ref must name its apiVersion.
        pub const FIELD_REF_API_VERSION: &str = "v1";
    }
}

pub const DEFAULT_LINKERD_PORT: &str = "4140";
pub const DEFAULT_LINKERD_SERVICE_NAME: &str = "l5d";
pub const DEFAULT_USE_SERVICE_VIP: bool = false;

pub const DOCUMENT_SEPARATOR: &str = "---";
