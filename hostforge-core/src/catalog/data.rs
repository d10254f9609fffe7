//! The built-in catalog dataset.
//!
//! WHMCS product ids are assigned in the billing backend's admin panel and
//! mirrored here; they must stay in sync with that installation.

use super::{Faq, Plan, Product, ProductCategory};

pub(super) static PRODUCTS: &[Product] = &[
    Product {
        slug: "minecraft",
        name: "Minecraft Server Hosting",
        category: ProductCategory::GameServer,
        description: "Instant Minecraft servers with modpack support, automated \
                      backups, and a full file manager.",
        faqs: &[
            Faq {
                question: "Can I install modpacks?",
                answer: "Yes. CurseForge and FTB modpacks install from the panel \
                         in one click, or upload your own server pack.",
            },
            Faq {
                question: "How many players can join?",
                answer: "There is no slot limit; practical player count depends \
                         on the memory tier you choose.",
            },
        ],
    },
    Product {
        slug: "valheim",
        name: "Valheim Server Hosting",
        category: ProductCategory::GameServer,
        description: "Dedicated Valheim worlds with automatic updates and \
                      world backups every six hours.",
        faqs: &[Faq {
            question: "Can I upload an existing world?",
            answer: "Yes, drop your world files into the save directory via \
                     the file manager or SFTP.",
        }],
    },
    Product {
        slug: "palworld",
        name: "Palworld Server Hosting",
        category: ProductCategory::GameServer,
        description: "High-clock CPUs tuned for Palworld's simulation load, \
                      with crossplay-ready builds.",
        faqs: &[Faq {
            question: "Do you support crossplay?",
            answer: "Crossplay-enabled builds are available from the version \
                     selector on every plan.",
        }],
    },
    Product {
        slug: "vps-cloud",
        name: "Cloud VPS",
        category: ProductCategory::Vps,
        description: "KVM virtual servers on NVMe storage with hourly \
                      snapshots and full root access.",
        faqs: &[Faq {
            question: "Which operating systems are available?",
            answer: "Ubuntu, Debian, Rocky Linux, and Windows Server images, \
                     or mount your own ISO.",
        }],
    },
    Product {
        slug: "vps-dedicated",
        name: "Dedicated-Core VPS",
        category: ProductCategory::Vps,
        description: "Pinned physical cores for steady performance under \
                      sustained load.",
        faqs: &[Faq {
            question: "Are the cores shared?",
            answer: "No. Each dedicated-core plan pins physical cores to your \
                     instance; nothing else is scheduled on them.",
        }],
    },
    Product {
        slug: "web-starter",
        name: "Starter Web Hosting",
        category: ProductCategory::WebHosting,
        description: "Managed shared hosting with one-click installers, free \
                      SSL, and daily backups.",
        faqs: &[Faq {
            question: "Is email included?",
            answer: "Every plan includes mailboxes under your domain with \
                     webmail and IMAP/SMTP access.",
        }],
    },
    Product {
        slug: "web-business",
        name: "Business Web Hosting",
        category: ProductCategory::WebHosting,
        description: "Isolated resources, staging environments, and priority \
                      support for production sites.",
        faqs: &[Faq {
            question: "Can I host multiple sites?",
            answer: "Business plans host unlimited sites within the plan's \
                     storage and resource allowance.",
        }],
    },
];

pub(super) static PLANS: &[Plan] = &[
    // Minecraft
    Plan {
        id: "mc-dirt",
        product_slug: "minecraft",
        name: "Dirt",
        monthly_price_cents: 499,
        features: &["2 GB RAM", "10 GB NVMe", "Plugin support", "DDoS protection"],
        whmcs_product_id: 101,
    },
    Plan {
        id: "mc-iron",
        product_slug: "minecraft",
        name: "Iron",
        monthly_price_cents: 999,
        features: &["6 GB RAM", "30 GB NVMe", "Modpack installer", "DDoS protection"],
        whmcs_product_id: 102,
    },
    Plan {
        id: "mc-diamond",
        product_slug: "minecraft",
        name: "Diamond",
        monthly_price_cents: 1_999,
        features: &[
            "12 GB RAM",
            "80 GB NVMe",
            "Dedicated IP",
            "Priority support",
        ],
        whmcs_product_id: 103,
    },
    // Valheim
    Plan {
        id: "val-viking",
        product_slug: "valheim",
        name: "Viking",
        monthly_price_cents: 899,
        features: &["4 GB RAM", "10 players", "6-hour backups"],
        whmcs_product_id: 111,
    },
    Plan {
        id: "val-warlord",
        product_slug: "valheim",
        name: "Warlord",
        monthly_price_cents: 1_499,
        features: &["8 GB RAM", "20 players", "6-hour backups", "Dedicated IP"],
        whmcs_product_id: 112,
    },
    // Palworld
    Plan {
        id: "pal-scout",
        product_slug: "palworld",
        name: "Scout",
        monthly_price_cents: 1_199,
        features: &["8 GB RAM", "16 players", "Crossplay builds"],
        whmcs_product_id: 121,
    },
    Plan {
        id: "pal-alpha",
        product_slug: "palworld",
        name: "Alpha",
        monthly_price_cents: 1_899,
        features: &["16 GB RAM", "32 players", "Crossplay builds", "Priority support"],
        whmcs_product_id: 122,
    },
    // Cloud VPS
    Plan {
        id: "vpsc-2",
        product_slug: "vps-cloud",
        name: "Cloud 2",
        monthly_price_cents: 1_200,
        features: &["2 vCPU", "4 GB RAM", "60 GB NVMe", "1 Gbps uplink"],
        whmcs_product_id: 201,
    },
    Plan {
        id: "vpsc-4",
        product_slug: "vps-cloud",
        name: "Cloud 4",
        monthly_price_cents: 2_400,
        features: &["4 vCPU", "8 GB RAM", "120 GB NVMe", "1 Gbps uplink"],
        whmcs_product_id: 202,
    },
    // Dedicated-core VPS
    Plan {
        id: "vpsd-4",
        product_slug: "vps-dedicated",
        name: "Dedicated 4",
        monthly_price_cents: 4_500,
        features: &["4 pinned cores", "16 GB RAM", "200 GB NVMe"],
        whmcs_product_id: 211,
    },
    Plan {
        id: "vpsd-8",
        product_slug: "vps-dedicated",
        name: "Dedicated 8",
        monthly_price_cents: 8_500,
        features: &["8 pinned cores", "32 GB RAM", "400 GB NVMe"],
        whmcs_product_id: 212,
    },
    // Starter web hosting
    Plan {
        id: "web-s1",
        product_slug: "web-starter",
        name: "Starter",
        monthly_price_cents: 299,
        features: &["1 site", "10 GB storage", "Free SSL", "Daily backups"],
        whmcs_product_id: 301,
    },
    Plan {
        id: "web-s2",
        product_slug: "web-starter",
        name: "Starter Plus",
        monthly_price_cents: 599,
        features: &["3 sites", "30 GB storage", "Free SSL", "Daily backups"],
        whmcs_product_id: 302,
    },
    // Business web hosting
    Plan {
        id: "web-b1",
        product_slug: "web-business",
        name: "Business",
        monthly_price_cents: 1_299,
        features: &[
            "Unlimited sites",
            "100 GB storage",
            "Staging environment",
            "Priority support",
        ],
        whmcs_product_id: 311,
    },
    Plan {
        id: "web-b2",
        product_slug: "web-business",
        name: "Business Pro",
        monthly_price_cents: 2_499,
        features: &[
            "Unlimited sites",
            "250 GB storage",
            "Staging environment",
            "Isolated resources",
        ],
        whmcs_product_id: 312,
    },
];
